use crate::bridge::BridgeRequest;

const MAX_HEADER_VALUE_LEN: usize = 200;

/// Renders the cURL command equivalent to `request`.
pub fn curl_command(request: &BridgeRequest) -> String {
    let mut curl = format!("curl -X {}", request.method);

    for (name, value) in &request.headers {
        // Long values (user agents, mostly) only add noise.
        if !value.trim().is_empty() && value.len() < MAX_HEADER_VALUE_LEN {
            curl.push_str(&format!(" \\\n  -H \"{name}: {value}\""));
        }
    }

    if request.method != "GET" && request.method != "DELETE" {
        if let Some(text) = request.body.as_ref().and_then(|b| b.display_text()) {
            curl.push_str(&format!(" \\\n  -d '{text}'"));
        }
    }

    curl.push_str(&format!(" \\\n  \"{}\"", request.url));
    curl
}
