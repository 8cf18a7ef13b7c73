use crate::config::LlmInferenceConf;
use crate::endpoints;
use toolbox_core::{PayloadError, PAYLOAD_SIZE};

/// Request text for the current configuration.
///
/// Always targets the canonical endpoint; `aggressive` and `metrics` are stored
/// but do not change endpoint selection yet.
pub fn render_request(conf: &LlmInferenceConf) -> String {
    let ep = endpoints::canonical();
    format!(
        "{} {} HTTP/1.1\r\n\
         Host: localhost\r\n\
         User-Agent: {}\r\n\
         Accept: */*\r\n\
         Connection: close\r\n\
         \r\n",
        ep.method,
        ep.path,
        conf.user_agent()
    )
}

/// Write the request into `buf`. Nothing is written if it does not fit.
pub fn build_request(conf: &LlmInferenceConf, buf: &mut [u8]) -> Result<usize, PayloadError> {
    let req = render_request(conf);
    let bytes = req.as_bytes();
    if bytes.len() > buf.len() {
        return Err(PayloadError::TooLarge { needed: bytes.len(), capacity: buf.len() });
    }
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(bytes.len())
}

/// Length `build_request` produces into a `PAYLOAD_SIZE` buffer.
pub fn request_length(conf: &LlmInferenceConf) -> Result<usize, PayloadError> {
    let mut scratch = [0u8; PAYLOAD_SIZE];
    build_request(conf, &mut scratch)
}
