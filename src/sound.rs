//! Alert playback
//!
//! Playback is delegated to a system audio player (`afplay` on macOS,
//! `paplay` elsewhere) so no audio stack is linked into the binary.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::errors::Result;
use crate::shell::CommandRunner;

/// Plays the configured alert sound once, returning when playback ends
#[async_trait]
pub trait SoundPlayer: Send + Sync {
    async fn play(&self) -> Result<()>;
}

#[async_trait]
impl<'a, T: SoundPlayer + ?Sized> SoundPlayer for &'a T {
    async fn play(&self) -> Result<()> {
        (**self).play().await
    }
}

/// Default audio player for this platform
pub fn default_player() -> &'static str {
    if cfg!(target_os = "macos") {
        "afplay"
    } else {
        "paplay"
    }
}

/// Runs `<player> <args...> <sound>` through a [`CommandRunner`]
pub struct CommandPlayer<R> {
    runner: R,
    player: String,
    args: Vec<String>,
    sound: PathBuf,
}

impl<R: CommandRunner> CommandPlayer<R> {
    pub fn new(runner: R, player: impl Into<String>, args: Vec<String>, sound: PathBuf) -> Self {
        Self {
            runner,
            player: player.into(),
            args,
            sound,
        }
    }

    fn command_args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(self.sound.to_string_lossy().into_owned());
        args
    }
}

#[async_trait]
impl<R: CommandRunner> SoundPlayer for CommandPlayer<R> {
    async fn play(&self) -> Result<()> {
        if !self.sound.exists() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("sound file {} does not exist", self.sound.display()),
            )
            .into());
        }

        self.runner.run(&self.player, &self.command_args()).await?;
        tracing::debug!(player = %self.player, sound = ?self.sound, "Played alert");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::FocusbellError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Player that only counts; clones share the count
    #[derive(Clone, Default)]
    pub(crate) struct CountingPlayer(Arc<AtomicUsize>);

    impl CountingPlayer {
        pub fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SoundPlayer for CountingPlayer {
        async fn play(&self) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, program: &str, args: &[String]) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            Ok(String::new())
        }
    }

    #[tokio::test]
    async fn test_play_invokes_player_with_sound_last() {
        let dir = tempfile::tempdir().unwrap();
        let sound = dir.path().join("alert.aiff");
        std::fs::write(&sound, b"FORM").unwrap();

        let runner = RecordingRunner::default();
        let player = CommandPlayer::new(&runner, "afplay", vec!["-v".into(), "0.5".into()], sound.clone());
        player.play().await.unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "afplay");
        assert_eq!(
            calls[0].1,
            vec![
                "-v".to_string(),
                "0.5".to_string(),
                sound.to_string_lossy().into_owned()
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_sound_is_error_without_running() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::default();
        let player = CommandPlayer::new(&runner, "afplay", Vec::new(), dir.path().join("missing.aiff"));

        assert!(matches!(player.play().await, Err(FocusbellError::Io(_))));
        assert!(runner.calls.lock().unwrap().is_empty());
    }
}
