use game::Coordinator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) coordinator: Coordinator,
}
