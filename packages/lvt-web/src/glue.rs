//! Bootstrap script embedded in the initial HTML response (spec §6), in
//! the shape of the teacher's `dioxus_liveview::interpreter_glue`: a small
//! `<script>` that opens the WebSocket back to this session and hands
//! incoming frames to the client reconstructor (out of core scope; see
//! spec §4.8).

/// Renders the glue snippet for a WS endpoint at `ws_path` (e.g. `/ws`).
pub fn interpreter_glue(ws_path: &str) -> String {
    format!(
        r#"<script type="module">
  const proto = location.protocol === "https:" ? "wss:" : "ws:";
  const socket = new WebSocket(proto + "//" + location.host + "{ws_path}");
  window.__lvt_socket = socket;
  socket.addEventListener("message", (event) => {{
    window.__lvt_apply && window.__lvt_apply(JSON.parse(event.data));
  }});
</script>"#
    )
}
