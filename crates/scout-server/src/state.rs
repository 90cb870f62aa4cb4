use scout::tools::ToolDispatcher;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: ToolDispatcher,
}
