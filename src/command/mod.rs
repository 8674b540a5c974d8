//! The command part of a TMI line.

mod name;
pub mod outgoing;

pub use self::name::{
    CommandName, RPL_CREATED, RPL_ENDOFMOTD, RPL_ENDOFNAMES, RPL_MOTD, RPL_MOTDSTART,
    RPL_MYINFO, RPL_NAMREPLY, RPL_WELCOME, RPL_YOURHOST,
};

/// Command word, positional arguments, and optional trailing text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Command {
    pub name: CommandName,
    pub arguments: Vec<String>,
    /// Free text after ` :`, if any.
    pub data: Option<String>,
}

impl Command {
    pub fn new(name: impl Into<CommandName>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Get the argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.arguments.get(index).map(String::as_str)
    }

    /// Trailing data, or `""` when absent.
    pub fn text(&self) -> &str {
        self.data.as_deref().unwrap_or("")
    }

    /// The first argument, if it names a channel.
    pub fn channel(&self) -> Option<&str> {
        self.arg(0).filter(|a| a.starts_with('#'))
    }
}

impl From<CommandName> for Command {
    fn from(name: CommandName) -> Self {
        Command::new(name)
    }
}
