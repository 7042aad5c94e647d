#![allow(dead_code)]

use std::collections::BTreeMap;

use dagsim::config::{
    ChatTurnConfig, OverheadSection, PlaybackSection, PricingSection, RawScenarioFile,
    RetrySection, ScenarioFile, ScenarioSection, TaskConfig, TokensSection,
};
use dagsim::dag::{ChatTurn, CoordinationOverhead, Scenario, Task};
use dagsim::types::ChatRole;

/// Builder for in-memory `Scenario`s.
pub struct ScenarioBuilder {
    name: String,
    tasks: Vec<Task>,
    transcript: Vec<ChatTurn>,
    overhead: CoordinationOverhead,
}

impl ScenarioBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tasks: Vec::new(),
            transcript: Vec::new(),
            overhead: CoordinationOverhead::default(),
        }
    }

    pub fn with_task(mut self, task: TaskBuilder) -> Self {
        self.tasks.push(task.build());
        self
    }

    /// Shorthand for a task with a duration and dependencies only.
    pub fn task(self, id: &str, duration: u64, after: &[&str]) -> Self {
        let mut builder = TaskBuilder::new(id, duration);
        for dep in after {
            builder = builder.after(dep);
        }
        self.with_task(builder)
    }

    pub fn chat(mut self, role: ChatRole, text: &str, at: u64) -> Self {
        self.transcript.push(ChatTurn {
            role,
            text: text.to_string(),
            at,
            tokens: 0,
        });
        self
    }

    pub fn staged_overhead(mut self, input_per_wave: u64, output_per_wave: u64) -> Self {
        self.overhead = CoordinationOverhead {
            staged_input_tokens_per_wave: input_per_wave,
            staged_output_tokens_per_wave: output_per_wave,
        };
        self
    }

    /// Build and validate, panicking on a malformed scenario.
    pub fn build(self) -> Scenario {
        self.try_build()
            .expect("Failed to build valid scenario from builder")
    }

    pub fn try_build(self) -> Result<Scenario, dagsim::errors::ScenarioError> {
        Ok(Scenario::new(self.name, self.tasks)?
            .with_transcript(self.transcript)
            .with_overhead(self.overhead))
    }
}

/// Builder for `Task`.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(id: &str, duration: u64) -> Self {
        Self {
            task: Task::new(id, duration),
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.deps.push(dep.to_string());
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.task.label = Some(label.to_string());
        self
    }

    pub fn tokens(mut self, input: u64, output: u64) -> Self {
        self.task.input_tokens = input;
        self.task.output_tokens = output;
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for `ScenarioFile`, going through the same validation as a file
/// on disk.
pub struct ScenarioFileBuilder {
    raw: RawScenarioFile,
}

impl ScenarioFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawScenarioFile {
                scenario: ScenarioSection::default(),
                pricing: PricingSection::default(),
                tokens: TokensSection::default(),
                overhead: OverheadSection::default(),
                playback: PlaybackSection::default(),
                retry: RetrySection::default(),
                task: BTreeMap::new(),
                chat: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, id: &str, task: TaskConfig) -> Self {
        self.raw.task.insert(id.to_string(), task);
        self
    }

    pub fn with_chat(mut self, role: ChatRole, text: &str, at: u64) -> Self {
        self.raw.chat.push(ChatTurnConfig {
            role,
            text: text.to_string(),
            at,
            tokens: None,
        });
        self
    }

    pub fn with_pricing(mut self, input_per_million: f64, output_per_million: f64) -> Self {
        self.raw.pricing = PricingSection {
            input_per_million,
            output_per_million,
        };
        self
    }

    pub fn raw(self) -> RawScenarioFile {
        self.raw
    }

    pub fn build(self) -> ScenarioFile {
        ScenarioFile::try_from(self.raw).expect("Failed to build valid scenario file from builder")
    }
}

impl Default for ScenarioFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(duration: u64) -> Self {
        Self {
            task: TaskConfig {
                label: None,
                duration,
                after: vec![],
                input_tokens: None,
                output_tokens: None,
                prompt: None,
                response: None,
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn tokens(mut self, input: u64, output: u64) -> Self {
        self.task.input_tokens = Some(input);
        self.task.output_tokens = Some(output);
        self
    }

    pub fn prompt(mut self, text: &str) -> Self {
        self.task.prompt = Some(text.to_string());
        self
    }

    pub fn response(mut self, text: &str) -> Self {
        self.task.response = Some(text.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
