// Copyright 2025-, EET-rs Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process mock of the registration service.
//!
//! Answers canned protocol XML the way the real playground does: it echoes
//! the message UUID and the BKP it finds in the request, so round-trip tests
//! can assert the dispatcher sent what it derived.

use std::net::SocketAddr;

use axum::{extract::State, http::StatusCode, routing::post, Router};
use tokio::net::TcpListener;

/// FIK issued for every confirmed receipt.
pub const FIK: &str = "ca46d50b-81a8-4f71-a0ba-b016e08a3600-ff";

/// What the mock answers with.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Confirm,
    ConfirmWithWarnings,
    Reject { code: i64 },
    Fault,
}

/// Starts the mock on an ephemeral port and serves until the test exits.
pub async fn run_server(behavior: Behavior) -> anyhow::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let socket_addr = listener.local_addr()?;
    let app = Router::new().route("/", post(handle)).with_state(behavior);
    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock registration service crashed");
    });
    Ok(socket_addr)
}

async fn handle(
    State(behavior): State<Behavior>,
    body: String,
) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    let message_uuid = extract(&body, "uuid_zpravy=\"", "\"").unwrap_or_default();
    let bkp = extract(&body, "encoding=\"base16\">", "<").unwrap_or_default();

    let (status, response) = match behavior {
        Behavior::Confirm => (StatusCode::OK, confirmation(&message_uuid, &bkp, "")),
        Behavior::ConfirmWithWarnings => (
            StatusCode::OK,
            confirmation(
                &message_uuid,
                &bkp,
                r#"<eet:Varovani kod_varov="5">Datum a cas prijeti trzby je vyrazne v minulosti</eet:Varovani>"#,
            ),
        ),
        Behavior::Reject { code } => (
            StatusCode::OK,
            format!(
                r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
 <soapenv:Body>
  <eet:Odpoved xmlns:eet="http://fs.mfcr.cz/eet/schema/v3">
   <eet:Hlavicka uuid_zpravy="{message_uuid}" dat_odmit="2019-08-11T15:36:15+02:00"/>
   <eet:Chyba kod="{code}" test="true">Datova zprava byla odmitnuta</eet:Chyba>
  </eet:Odpoved>
 </soapenv:Body>
</soapenv:Envelope>"#
            ),
        ),
        Behavior::Fault => (
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
 <soapenv:Body>
  <soapenv:Fault>
   <faultcode>soapenv:Client</faultcode>
   <faultstring>Message does not conform to the schema</faultstring>
  </soapenv:Fault>
 </soapenv:Body>
</soapenv:Envelope>"#
                .to_string(),
        ),
    };

    (status, [("content-type", "text/xml; charset=utf-8")], response)
}

fn confirmation(message_uuid: &str, bkp: &str, warnings: &str) -> String {
    format!(
        r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
 <soapenv:Body>
  <eet:Odpoved xmlns:eet="http://fs.mfcr.cz/eet/schema/v3">
   <eet:Hlavicka uuid_zpravy="{message_uuid}" bkp="{bkp}" dat_prij="2019-08-11T15:36:15+02:00"/>
   <eet:Potvrzeni fik="{FIK}" test="true"/>{warnings}
  </eet:Odpoved>
 </soapenv:Body>
</soapenv:Envelope>"#
    )
}

fn extract<'a>(body: &'a str, start: &str, end: &str) -> Option<&'a str> {
    body.split(start).nth(1)?.split(end).next()
}
