//! JavaScript side of the bridge, injected into every window.

/// Sets up `window.kiln.ipc` before any page script runs.
///
/// `request` resolves when the host answers with a `response` push carrying
/// the same id. Close questions with no registered handler are confirmed
/// straight away.
pub const IPC_INIT_SCRIPT: &str = r#"
(function() {
    window.kiln = window.kiln || {};
    var nextId = 1;
    var pending = {};
    var CLOSE_QUESTIONS = ['about-to-close', 'request-close', 'request-secondary-close'];
    window.kiln.ipc = {
        send: function(kind, payload) {
            window.ipc.postMessage(JSON.stringify({
                kind: kind,
                payload: payload === undefined ? null : payload
            }));
        },
        request: function(kind, payload) {
            var id = nextId++;
            return new Promise(function(resolve, reject) {
                pending[id] = { resolve: resolve, reject: reject };
                window.ipc.postMessage(JSON.stringify({
                    kind: kind,
                    id: id,
                    payload: payload === undefined ? null : payload
                }));
            });
        },
        reply: function(channel, value) {
            this.send('reply', { channel: channel, value: value === undefined ? null : value });
        },
        _handlers: {},
        on: function(kind, callback) {
            this._handlers[kind] = callback;
        },
        _dispatch: function(kind, payload) {
            if (kind === 'response' && payload && pending[payload.id]) {
                var slot = pending[payload.id];
                delete pending[payload.id];
                if (payload.error !== undefined) {
                    slot.reject(new Error(payload.error));
                } else {
                    slot.resolve(payload.result);
                }
                return;
            }
            var handler = this._handlers[kind];
            if (handler) {
                handler(payload);
                return;
            }
            // Nobody listens for close questions: let the close go ahead.
            if (payload && payload.reply && CLOSE_QUESTIONS.indexOf(kind) !== -1) {
                this.reply(payload.reply.confirm, true);
            }
        }
    };
})();
"#;

/// JS snippet delivering one push into `window.kiln.ipc._dispatch`.
pub fn js_dispatch_message(kind: &str, payload: &serde_json::Value) -> String {
    let payload_json = serde_json::to_string(payload).unwrap_or_else(|_| "null".to_string());
    format!(
        "window.kiln.ipc._dispatch({}, {});",
        serde_json::to_string(kind).unwrap_or_else(|_| "\"unknown\"".to_string()),
        payload_json,
    )
}
