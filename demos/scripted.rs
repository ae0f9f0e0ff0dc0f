use rgenstudio::{
    CreativeApp, GeminiClient, MockIdentityProvider, ReplyPart, ScriptedBackend, View,
};
use std::sync::Arc;

/// Runs one generate and one edit against canned replies, no network.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rgenstudio::logger::init()?;

    let backend = Arc::new(
        ScriptedBackend::new()
            .reply_parts(vec![ReplyPart::image("iVBORw0KGgo=", Some("image/png"))])
            .reply_parts(vec![ReplyPart::text("I cannot do that")]),
    );
    let client = GeminiClient::with_backend(backend.clone());

    let mut app = CreativeApp::new(MockIdentityProvider);
    let user = app.sign_in()?.clone();
    println!("signed in as {}", user.email);

    let studio = app.studio_mut().ok_or("no active session")?;
    studio.set_prompt("a red balloon");
    println!("{:?}", studio.submit(client.image()).await);

    studio.attach(b"\x89PNG".to_vec(), "image/png")?;
    studio.set_prompt("make it blue");
    studio.submit(client.image()).await;
    if let View::Error(message) = studio.view() {
        println!("edit refused: {}", message);
    }

    println!("requests sent: {}", backend.request_count());
    app.sign_out();
    Ok(())
}
