#![allow(dead_code)]

use myrtio_choreographer::{AudioCue, Level, Line, OutputDriver, OutputError};

/// Output driver that records what the engine wrote
#[derive(Debug, Default)]
pub struct MockDriver {
    levels: [Option<Level>; Line::COUNT],
    duties: [f32; Line::COUNT],
    pub writes: Vec<(Line, Level)>,
    pub duty_commands: Vec<(Line, f32)>,
    pub fail_writes: bool,
    pub fail_duty: bool,
}

impl MockDriver {
    /// Last physical level written to a line
    pub fn level(&self, line: Line) -> Option<Level> {
        self.levels[line.index()]
    }

    pub fn duty(&self, line: Line) -> f32 {
        self.duties[line.index()]
    }

    pub fn writes_to(&self, line: Line) -> usize {
        self.writes.iter().filter(|(l, _)| *l == line).count()
    }

    pub fn duty_commands_to(&self, line: Line) -> usize {
        self.duty_commands.iter().filter(|(l, _)| *l == line).count()
    }
}

impl OutputDriver for MockDriver {
    fn write(&mut self, line: Line, level: Level) -> Result<(), OutputError> {
        if self.fail_writes {
            return Err(OutputError::Io);
        }
        self.levels[line.index()] = Some(level);
        self.writes.push((line, level));
        Ok(())
    }

    fn set_duty(&mut self, line: Line, duty: f32) -> Result<(), OutputError> {
        if self.fail_duty {
            return Err(OutputError::Disconnected);
        }
        self.duties[line.index()] = duty;
        self.duty_commands.push((line, duty));
        Ok(())
    }
}

/// Audio collaborator that records intents
#[derive(Debug, Default)]
pub struct MockAudio {
    pub begins: Vec<bool>,
    pub stops: usize,
    pub fail_begin: bool,
}

impl AudioCue for MockAudio {
    fn begin(&mut self, muted: bool) -> Result<(), OutputError> {
        if self.fail_begin {
            return Err(OutputError::Io);
        }
        self.begins.push(muted);
        Ok(())
    }

    fn request_stop(&mut self) -> Result<(), OutputError> {
        self.stops += 1;
        Ok(())
    }
}
