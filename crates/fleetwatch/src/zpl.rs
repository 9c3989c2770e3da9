//! Label commands for the printers' description language.
//!
//! Payloads are opaque to the probes; these helpers only build the handful
//! of labels and queries operators use for diagnostics.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// A named printer command from the diagnostic catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandTemplate {
    pub name: &'static str,
    pub command: String,
}

/// Test label with the printer id, a timestamp and a CODE128 barcode of the epoch millis
pub fn test_label(printer_id: &str, now: DateTime<Utc>) -> String {
    format!(
        "\n^XA\n\
         ^FO50,50^A0N,50,50^FDTest Label^FS\n\
         ^FO50,120^A0N,30,30^FDPrinter: {printer_id}^FS\n\
         ^FO50,170^A0N,30,30^FDTime: {time}^FS\n\
         ^FO50,220^BY3\n\
         ^BCN,100,Y,N,N\n\
         ^FD{millis}^FS\n\
         ^XZ\n",
        time = now.to_rfc3339_opts(SecondsFormat::Millis, true),
        millis = now.timestamp_millis(),
    )
}

/// Common commands, in a stable order
pub fn common_commands(now: DateTime<Utc>) -> Vec<CommandTemplate> {
    let template = |name, command: &str| CommandTemplate { name, command: command.to_string() };

    vec![
        template("host_identification", "~HI"),
        template("host_status", "~HS"),
        template("configuration", "^WD"),
        template("ping", "PING"),
        CommandTemplate {
            name: "test_label",
            command: format!(
                "^XA\n^FO50,50^A0N,50,50^FDTest Label^FS\n^FO50,120^A0N,30,30^FDTimestamp: {}^FS\n^XZ",
                now.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
        },
        template("barcode_test", "^XA\n^FO50,50^BY3\n^BCN,100,Y,N,N\n^FD123456789^FS\n^XZ"),
    ]
}
