use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

#[derive(Resource, Default)]
pub struct LoadingProgress {
    pub objects_loaded: bool,
}

// Enter Running once the scene objects are in the store and the world
pub fn transition_to_running(
    loading_progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loading_progress.objects_loaded {
        info!("→ Scene ready, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}
