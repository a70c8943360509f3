//! Auxiliary dispatch (spec §4.6): hot-comment recognition and the
//! probe-log file lifecycle it drives. `setMotionControlMode` and
//! `setNaivecamTolerance` live on [`crate::engine::CanonEngine`] directly
//! alongside the rest of the canonical-state mutators (spec §4.4).

use crate::engine::CanonEngine;
use crate::error::CanonResult;
use crate::message::MotionMessage;
use std::io::Write;

impl CanonEngine {
    /// `COMMENT(text)`: recognizes the hot-comment forms `RPY r p y`,
    /// `PROBEOPEN <path>`, `PROBECLOSE`; anything else passes through as a
    /// plain comment message.
    pub fn dispatch_comment(&mut self, line: u32, text: &str) -> CanonResult<()> {
        let trimmed = text.trim();
        let mut words = trimmed.split_whitespace();
        match words.next().map(|w| w.to_ascii_uppercase()) {
            Some(kw) if kw == "RPY" => {
                let rest: Vec<&str> = words.collect();
                tracing::info!(
                    roll_pitch_yaw = ?rest,
                    "RPY hot-comment observed; this model only rotates about Z (xy_rotation) so r/p/y are logged, not applied"
                );
                Ok(())
            }
            Some(kw) if kw == "PROBEOPEN" => {
                let path = words.next().unwrap_or_default();
                match std::fs::File::create(path) {
                    Ok(file) => {
                        self.probe_log = Some(file);
                        self.last_probed = None;
                    }
                    Err(err) => {
                        tracing::error!(path, error = %err, "failed to open probe log");
                        self.push(
                            line,
                            MotionMessage::OperatorMessage {
                                text: format!("cannot open probe log {path}: {err}"),
                                is_error: true,
                            },
                        );
                    }
                }
                Ok(())
            }
            Some(kw) if kw == "PROBECLOSE" => {
                self.probe_log = None;
                Ok(())
            }
            _ => {
                self.push(line, MotionMessage::Comment { text: trimmed.to_string() });
                Ok(())
            }
        }
    }

    /// Append one probe sample to the open probe log, nine space-separated
    /// program-unit coordinates, newline-terminated (spec §6).
    pub(crate) fn log_probe_sample(&mut self, program_pose: &crate::units::Pose) {
        let Some(file) = self.probe_log.as_mut() else { return };
        let line = format!(
            "{} {} {} {} {} {} {} {} {}\n",
            program_pose.x,
            program_pose.y,
            program_pose.z,
            program_pose.a,
            program_pose.b,
            program_pose.c,
            program_pose.u,
            program_pose.v,
            program_pose.w,
        );
        if let Err(err) = file.write_all(line.as_bytes()) {
            tracing::error!(error = %err, "probe log write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_comment_is_appended_as_message() {
        let mut e = CanonEngine::new();
        e.dispatch_comment(1, "just a note").unwrap();
        assert_eq!(e.interpreter_list().len(), 1);
        assert!(matches!(&e.interpreter_list()[0].payload, MotionMessage::Comment { .. }));
    }

    #[test]
    fn rpy_hot_comment_emits_no_message() {
        let mut e = CanonEngine::new();
        e.dispatch_comment(1, "RPY 1.0 2.0 3.0").unwrap();
        assert!(e.interpreter_list().is_empty());
    }

    #[test]
    fn probeopen_then_probeclose_round_trip() {
        let mut e = CanonEngine::new();
        let path = std::env::temp_dir().join("gcodekit5-canon-test-probe.log");
        let path_str = path.to_string_lossy().to_string();
        e.dispatch_comment(1, &format!("PROBEOPEN {path_str}")).unwrap();
        assert!(e.probe_log.is_some());
        e.dispatch_comment(2, "PROBECLOSE").unwrap();
        assert!(e.probe_log.is_none());
        let _ = std::fs::remove_file(path);
    }
}
