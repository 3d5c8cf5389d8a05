use log::info;

/// Status text channel from the flight stack to whoever is listening.
#[derive(Debug, Clone, Default)]
pub struct CommLink {
    messages: Vec<String>,
}

impl CommLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_message(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        info!("fc: {}", msg);
        self.messages.push(msg);
    }

    pub fn pending(&self) -> usize {
        self.messages.len()
    }

    /// Hand over everything queued so far.
    pub fn drain_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_queue() {
        let mut link = CommLink::new();
        link.log_message("armed");
        link.log_message(String::from("takeoff"));
        assert_eq!(link.pending(), 2);
        assert_eq!(link.drain_messages(), vec!["armed".to_string(), "takeoff".to_string()]);
        assert!(link.drain_messages().is_empty());
    }
}
