use bevy::prelude::*;

use crate::shared::*;

const MAX_VISIBLE: usize = 3;
const FADE_SECS: f32 = 0.5;

// ═══════════════════════════════════════════════════════════════════════
// RESOURCES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ActiveToast {
    pub message: String,
    pub timer: Timer,
    pub fade_timer: Option<Timer>,
}

impl ActiveToast {
    /// 1.0 while showing, falling to 0.0 over the fade.
    pub fn alpha(&self) -> f32 {
        match &self.fade_timer {
            Some(fade) => 1.0 - fade.fraction(),
            None => 1.0,
        }
    }
}

/// Toasts currently on screen, oldest first.
#[derive(Resource, Debug, Clone, Default)]
pub struct ToastFeed {
    pub toasts: Vec<ActiveToast>,
}

impl ToastFeed {
    pub fn push(&mut self, message: String, duration_secs: f32) {
        if self.toasts.len() >= MAX_VISIBLE {
            self.toasts.remove(0);
        }
        self.toasts.push(ActiveToast {
            message,
            timer: Timer::from_seconds(duration_secs.max(0.0), TimerMode::Once),
            fade_timer: None,
        });
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.toasts.iter().map(|t| t.message.as_str())
    }

    /// Run the show timer, then the fade, then drop the toast.
    pub fn tick(&mut self, delta: std::time::Duration) {
        for toast in &mut self.toasts {
            match toast.fade_timer.as_mut() {
                None => {
                    toast.timer.tick(delta);
                    if toast.timer.finished() {
                        toast.fade_timer = Some(Timer::from_seconds(FADE_SECS, TimerMode::Once));
                    }
                }
                Some(fade) => {
                    fade.tick(delta);
                }
            }
        }
        self.toasts
            .retain(|t| !t.fade_timer.as_ref().is_some_and(Timer::finished));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn handle_toast_events(mut events: EventReader<ToastEvent>, mut feed: ResMut<ToastFeed>) {
    for event in events.read() {
        feed.push(event.message.clone(), event.duration_secs);
    }
}

pub fn update_toasts(time: Res<Time>, mut feed: ResMut<ToastFeed>) {
    feed.tick(time.delta());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_only_three_toasts_visible() {
        let mut feed = ToastFeed::default();
        for i in 0..5 {
            feed.push(format!("toast {i}"), TOAST_SECS);
        }
        let shown: Vec<&str> = feed.messages().collect();
        assert_eq!(shown, vec!["toast 2", "toast 3", "toast 4"]);
    }

    #[test]
    fn test_toast_fades_then_disappears() {
        let mut feed = ToastFeed::default();
        feed.push("Inventory is full".into(), 1.0);
        feed.tick(Duration::from_millis(1000));
        assert_eq!(feed.toasts.len(), 1);
        feed.tick(Duration::from_millis(250));
        assert!((feed.toasts[0].alpha() - 0.5).abs() < 1e-3);
        feed.tick(Duration::from_millis(250));
        assert!(feed.toasts.is_empty());
    }
}
