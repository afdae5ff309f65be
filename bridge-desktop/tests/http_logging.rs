//! Credentials sent as query parameters must not reach the logs.

use std::io;
use std::sync::{Arc, Mutex};

use bridge_desktop::ReqwestHttpClient;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use tracing::Level;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_failed_login_request_keeps_password_out_of_logs() {
    let buffer = SharedBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let client = ReqwestHttpClient::new().unwrap();
    let request = HttpRequest::new(
        HttpMethod::Post,
        "http://127.0.0.1:9/user/login?username=ops&password=hunter2",
    );

    let error = client.execute(request).await.unwrap_err();

    assert!(!error.to_string().contains("hunter2"));
    let logs = buffer.contents();
    assert!(logs.contains("HTTP request failed"), "logs: {logs}");
    assert!(logs.contains("/user/login"));
    assert!(!logs.contains("hunter2"), "logs: {logs}");
}
