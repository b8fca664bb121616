//! Toggle button
//!
//! The button's id doubles as its trigger name. htmx sends the button's
//! `hx-vals` with every click; the reply is the button in the opposite
//! state, swapped into the page by id.

use hx_sockets::{Client, HxHeaders, SocketResult, SocketServer};
use serde::Deserialize;
use std::sync::Arc;

/// Trigger name, also the button's element id
pub const TRIGGER: &str = "some_message";

/// Message sent by the button
#[derive(Debug, Deserialize)]
pub struct ToggleMessage {
    #[serde(rename = "HEADERS", default)]
    pub headers: HxHeaders,

    /// State the button was rendered with
    #[serde(default)]
    pub state: bool,
}

/// Register the toggle handler
pub fn register(server: &SocketServer) -> SocketResult<()> {
    server.listen(TRIGGER, handle)
}

async fn handle(client: Arc<Client>, message: Vec<u8>) -> anyhow::Result<()> {
    let message: ToggleMessage = serde_json::from_slice(&message)?;
    let next = !message.state;

    tracing::debug!(
        client_id = %client.id(),
        target = ?message.headers.target,
        state = next,
        "Toggling button"
    );

    client.send(render_button(next)).await?;
    Ok(())
}

/// Render the button in the given state
pub fn render_button(on: bool) -> String {
    let label = if on { "on" } else { "off" };

    format!(
        r#"<button
		id="{TRIGGER}"
		hx-vals='{{"state": {on}}}'
		hx-trigger="click"
		ws-send
		>
		{label}
	</button>"#
    )
}

/// Landing page that opens the socket at `ws_path`
pub fn index_page(ws_path: &str) -> String {
    let button = render_button(false);

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
	<meta charset="utf-8">
	<title>hx-sockets demo</title>
	<script src="https://unpkg.com/htmx.org@1.9.12"></script>
	<script src="https://unpkg.com/htmx.org@1.9.12/dist/ext/ws.js"></script>
</head>
<body>
	<div hx-ext="ws" ws-connect="{ws_path}">
		{button}
	</div>
</body>
</html>
"#
    )
}
