//! Sandbox line numbers to editor line numbers

use super::types::LineMapping;
use crate::languages::LanguageConfig;

/// Maps lines reported by the sandbox into the user's editor buffer
#[derive(Debug, Clone, Copy)]
pub struct LineMapper {
    policy: LineMapping,
    offset: u32,
    /// Length of the user's buffer; 0 means unknown
    user_line_count: u32,
}

impl LineMapper {
    pub fn new(policy: LineMapping, config: &LanguageConfig, user_line_count: u32) -> Self {
        let offset = match policy {
            LineMapping::Direct => 0,
            LineMapping::WrapperOffset => config.wrapper_offset,
        };
        Self {
            policy,
            offset,
            user_line_count,
        }
    }

    pub fn policy(&self) -> LineMapping {
        self.policy
    }

    /// User-visible line for a sandbox line, or None when it belongs to the harness
    pub fn to_user_line(&self, reported: u32) -> Option<u32> {
        let line = reported.checked_sub(self.offset).filter(|line| *line > 0)?;
        if self.user_line_count > 0 && line > self.user_line_count {
            return None;
        }
        Some(line)
    }

    /// Like `to_user_line`, but parse errors past the end of the buffer
    /// point at its last line (an unclosed construct runs into the harness)
    pub fn to_user_line_clamped(&self, reported: u32) -> Option<u32> {
        let line = reported.checked_sub(self.offset).filter(|line| *line > 0)?;
        if self.user_line_count > 0 {
            Some(line.min(self.user_line_count))
        } else {
            Some(line)
        }
    }
}
