//! Headers-file transcript.
//!
//! ```text
//! <METHOD> <raw-url>
//!
//! > <header-1>
//!
//! <request body, if any>
//!
//! < <proto> <status>
//! < <Name>: <value>
//! ```

use crate::client::ResponseRecord;
use crate::request::RequestSpec;

pub fn render_transcript(spec: &RequestSpec, response: &ResponseRecord) -> String {
    let mut buf = String::new();
    buf.push_str(&format!("{} {}\n\n", spec.method, spec.url));
    for h in &spec.headers {
        buf.push_str(&format!("> {h}\n"));
    }
    buf.push('\n');

    if !spec.body.is_empty() {
        buf.push_str(&spec.body);
        buf.push_str("\n\n");
    }

    buf.push_str(&format!("< {} {}\n", response.proto, response.status_text));
    for (name, value) in &response.headers {
        buf.push_str(&format!("< {name}: {value}\n"));
    }
    buf
}
