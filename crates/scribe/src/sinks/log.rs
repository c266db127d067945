//! LogSink - traces every edit before forwarding it

use contracts::{Edit, EditSink};
use tracing::{info, instrument};

/// Decorator that logs each edit and the inner sink's verdict
pub struct LogSink<S> {
    name: String,
    inner: S,
}

impl<S: EditSink> LogSink<S> {
    /// Wrap `inner`; the wrapper is named after it
    pub fn new(inner: S) -> Self {
        Self {
            name: format!("log({})", inner.name()),
            inner,
        }
    }

    fn log_edit(&self, edit: &Edit, accepted: bool) {
        info!(
            sink = %self.name,
            edit_id = edit.id,
            event = %edit.event,
            row = edit.row,
            col = edit.col,
            character = ?edit.as_char(),
            timestamp = edit.timestamp,
            accepted,
            "Edit received"
        );
    }
}

impl<S: EditSink> EditSink for LogSink<S> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_add",
        skip(self, edit),
        fields(sink = %self.name, edit_id = edit.id)
    )]
    fn apply_add(&mut self, edit: Edit) -> bool {
        let accepted = self.inner.apply_add(edit);
        self.log_edit(&edit, accepted);
        accepted
    }

    #[instrument(
        name = "log_sink_delete",
        skip(self, edit),
        fields(sink = %self.name, edit_id = edit.id)
    )]
    fn apply_delete(&mut self, edit: Edit) -> bool {
        let accepted = self.inner.apply_delete(edit);
        self.log_edit(&edit, accepted);
        accepted
    }

    #[instrument(name = "log_sink_close", skip(self))]
    fn close(&mut self) {
        self.inner.close();
        info!(sink = %self.name, "LogSink closed");
    }
}
