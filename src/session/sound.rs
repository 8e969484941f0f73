//! Ambient sound playback.
//!
//! The output stream is not `Send`, so with the `audio` feature a dedicated thread owns
//! it and receives commands over a channel. Opening and decoding the asset happens on that
//! thread, which answers each play request. Callers only ever touch the handle through a
//! mutex, so concurrent start/stop calls are serialized.

use crate::error::SoundError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

pub trait SoundPlayer: Send + Sync {
    /// Begin playback unless already playing.
    fn start(&self) -> Result<(), SoundError>;
    /// Halt playback if active.
    fn stop(&self);
    fn is_playing(&self) -> bool;
}

/// Player used when sound is disabled or no backend is available.
#[derive(Debug, Default)]
pub struct NullPlayer;

impl SoundPlayer for NullPlayer {
    fn start(&self) -> Result<(), SoundError> {
        Ok(())
    }

    fn stop(&self) {}

    fn is_playing(&self) -> bool {
        false
    }
}

/// Pick the best available player. The returned message explains a fallback to silence.
pub fn build_player(asset: &Path, enabled: bool) -> (Arc<dyn SoundPlayer>, Option<String>) {
    if !enabled {
        return (Arc::new(NullPlayer), None);
    }
    open_backend(asset)
}

#[cfg(feature = "audio")]
fn open_backend(asset: &Path) -> (Arc<dyn SoundPlayer>, Option<String>) {
    match backend::RodioPlayer::new(asset.to_path_buf()) {
        Ok(player) => (Arc::new(player), None),
        Err(e) => {
            warn!(asset = %display_name(asset), error = %e, "falling back to silent sessions");
            (Arc::new(NullPlayer), Some(e.to_string()))
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_backend(asset: &Path) -> (Arc<dyn SoundPlayer>, Option<String>) {
    let msg = format!(
        "built without audio support, {} will not play",
        display_name(asset)
    );
    warn!("{msg}");
    (Arc::new(NullPlayer), Some(msg))
}

fn display_name(asset: &Path) -> String {
    asset
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| PathBuf::from(asset).display().to_string())
}

#[cfg(feature = "audio")]
mod backend {
    use super::SoundPlayer;
    use crate::error::SoundError;
    use rodio::{Decoder, OutputStream, Sink, Source};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};
    use std::sync::mpsc as std_mpsc;
    use std::sync::Mutex;
    use tracing::debug;

    type Reply = std_mpsc::Sender<Result<(), SoundError>>;

    enum AudioCommand {
        /// Open the asset and loop it. The audio thread answers once the sink plays.
        Play(PathBuf, Reply),
        Stop,
    }

    struct PlaybackHandle {
        tx: std_mpsc::Sender<AudioCommand>,
        playing: bool,
    }

    impl PlaybackHandle {
        fn play(&mut self, asset: &Path) -> Result<(), SoundError> {
            if self.playing {
                return Ok(());
            }
            let (reply_tx, reply_rx) = std_mpsc::channel();
            self.tx
                .send(AudioCommand::Play(asset.to_path_buf(), reply_tx))
                .map_err(|_| SoundError::Backend("audio thread exited".into()))?;
            reply_rx
                .recv()
                .map_err(|_| SoundError::Backend("audio thread exited".into()))??;
            self.playing = true;
            Ok(())
        }

        fn stop(&mut self) {
            if !self.playing {
                return;
            }
            let _ = self.tx.send(AudioCommand::Stop);
            self.playing = false;
        }
    }

    pub struct RodioPlayer {
        asset: PathBuf,
        handle: Mutex<PlaybackHandle>,
    }

    impl RodioPlayer {
        pub fn new(asset: PathBuf) -> Result<Self, SoundError> {
            let (tx, rx) = std_mpsc::channel::<AudioCommand>();
            let (ready_tx, ready_rx) = std_mpsc::channel::<Result<(), String>>();

            std::thread::Builder::new()
                .name("audio".into())
                .spawn(move || {
                    let (_stream, stream_handle) = match OutputStream::try_default() {
                        Ok(pair) => pair,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e.to_string()));
                            return;
                        }
                    };
                    let _ = ready_tx.send(Ok(()));

                    let mut sink: Option<Sink> = None;
                    for cmd in rx {
                        match cmd {
                            AudioCommand::Play(path, reply) => {
                                if sink.as_ref().is_some_and(|s| !s.empty()) {
                                    let _ = reply.send(Ok(()));
                                    continue;
                                }
                                let res = open_source(&path).and_then(|source| {
                                    let s = Sink::try_new(&stream_handle)
                                        .map_err(|e| SoundError::Backend(e.to_string()))?;
                                    s.append(source.repeat_infinite());
                                    Ok(s)
                                });
                                let res = res.map(|s| {
                                    sink = Some(s);
                                    debug!(path = %path.display(), "sound playing");
                                });
                                let _ = reply.send(res);
                            }
                            AudioCommand::Stop => {
                                if let Some(s) = sink.take() {
                                    s.stop();
                                    debug!("sound stopped");
                                }
                            }
                        }
                    }
                })
                .map_err(|e| SoundError::Backend(e.to_string()))?;

            match ready_rx.recv() {
                Ok(Ok(())) => Ok(Self {
                    asset,
                    handle: Mutex::new(PlaybackHandle { tx, playing: false }),
                }),
                Ok(Err(e)) => Err(SoundError::Backend(e)),
                Err(_) => Err(SoundError::Backend("audio thread exited".into())),
            }
        }
    }

    fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, SoundError> {
        let file = File::open(path).map_err(|_| SoundError::AssetMissing(path.to_path_buf()))?;
        Decoder::new(BufReader::new(file)).map_err(|e| SoundError::Decode {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }

    impl SoundPlayer for RodioPlayer {
        fn start(&self) -> Result<(), SoundError> {
            self.handle
                .lock()
                .map_err(|_| SoundError::Backend("playback handle poisoned".into()))?
                .play(&self.asset)
        }

        fn stop(&self) {
            if let Ok(mut handle) = self.handle.lock() {
                handle.stop();
            }
        }

        fn is_playing(&self) -> bool {
            self.handle.lock().map(|h| h.playing).unwrap_or(false)
        }
    }

}
