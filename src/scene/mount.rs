//! Scene lifecycle: the camera transition follows mount and unmount.

use super::camera::{
    CameraSink, CameraTransition, CameraTransitionConfig, TransitionHandle, TransitionStatus,
};
use web_time::Instant;

/// Mounted map scene. Owns at most one camera transition at a time.
///
/// Dropping a mounted scene unmounts it, so a transition never outlives the
/// scene that started it.
pub struct Scene {
    camera: CameraTransitionConfig,
    transition: Option<(CameraTransition, TransitionHandle)>,
}

impl Scene {
    pub fn new(camera: CameraTransitionConfig) -> Self {
        Self {
            camera,
            transition: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.transition.is_some()
    }

    /// Starts the camera transition. Mounting an already mounted scene
    /// returns the existing handle without restarting.
    pub fn mount(&mut self, now: Instant) -> TransitionHandle {
        if let Some((_, handle)) = &self.transition {
            return handle.clone();
        }

        log::debug!(
            "Scene mounted, camera transition over {:.2}s",
            self.camera.duration_secs
        );
        let (transition, handle) = CameraTransition::start(&self.camera, now);
        self.transition = Some((transition, handle.clone()));
        handle
    }

    /// Advances the transition, if any.
    pub fn tick(&mut self, now: Instant, sink: &mut dyn CameraSink) -> TransitionStatus {
        match &mut self.transition {
            Some((transition, _)) => transition.tick(now, sink),
            None => TransitionStatus::Idle,
        }
    }

    /// Teardown hook. Cancels the transition before returning.
    pub fn on_unmount(&mut self) {
        if let Some((transition, handle)) = self.transition.take() {
            if transition.status() == TransitionStatus::Running {
                log::debug!("Scene unmounted mid-transition, cancelling");
            }
            handle.cancel();
        }
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.on_unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::camera::tests::RecordingCamera;
    use std::time::Duration;

    #[test]
    fn test_unmount_mid_flight_stops_writes() {
        let mut scene = Scene::new(CameraTransitionConfig::default());
        let mut camera = RecordingCamera::default();
        let start = Instant::now();

        let handle = scene.mount(start);
        assert_eq!(
            scene.tick(start + Duration::from_millis(300), &mut camera),
            TransitionStatus::Running
        );
        assert_eq!(
            scene.tick(start + Duration::from_millis(600), &mut camera),
            TransitionStatus::Running
        );
        let writes_before = camera.writes.len();

        scene.on_unmount();
        assert!(handle.is_cancelled());
        assert!(!scene.is_mounted());

        for ms in [900, 1500, 3000] {
            assert_eq!(
                scene.tick(start + Duration::from_millis(ms), &mut camera),
                TransitionStatus::Idle
            );
        }
        assert_eq!(camera.writes.len(), writes_before);
    }

    #[test]
    fn test_mount_is_idempotent() {
        let mut scene = Scene::new(CameraTransitionConfig::default());
        let start = Instant::now();

        let first = scene.mount(start);
        let second = scene.mount(start + Duration::from_millis(100));
        first.cancel();
        assert!(second.is_cancelled());
    }

    #[test]
    fn test_drop_cancels() {
        let handle = {
            let mut scene = Scene::new(CameraTransitionConfig::default());
            scene.mount(Instant::now())
        };
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_remount_restarts() {
        let mut scene = Scene::new(CameraTransitionConfig::default());
        let mut camera = RecordingCamera::default();
        let start = Instant::now();

        scene.mount(start);
        scene.on_unmount();
        let later = start + Duration::from_secs(10);
        scene.mount(later);

        assert_eq!(scene.tick(later, &mut camera), TransitionStatus::Running);
        assert_eq!(camera.writes.len(), 1);
    }
}
