use super::*;

impl DialogueEngine {
    pub fn new(graph: DialogueGraph, commands: CommandTable, variables: VariableStore) -> Self {
        Self {
            graph,
            commands,
            variables,
            dialogue: None,
            cursor: Cursor::Idle,
        }
    }

    /// Starts `dialogue` from its entry line, replacing any running session.
    pub fn start(&mut self, dialogue: &str) -> Result<(), DialogueError> {
        let entry = self.graph.entry(dialogue)?;
        let first =
            Walker::new(&self.commands, &mut self.variables).resolve(&self.graph, Some(entry))?;
        log::debug!("started dialogue `{}`", dialogue);
        self.dialogue = Some(dialogue.to_string());
        self.cursor = first.map_or(Cursor::Ended, Cursor::At);
        Ok(())
    }

    pub fn restart(&mut self) -> Result<(), DialogueError> {
        let dialogue = self
            .dialogue
            .clone()
            .ok_or_else(|| DialogueError::session("no dialogue has been started"))?;
        self.start(&dialogue)
    }

    /// Closes the session. `next_output` fails until `start` is called again.
    pub fn finish(&mut self) {
        if let Some(dialogue) = self.dialogue.take() {
            log::debug!("finished dialogue `{}`", dialogue);
        }
        self.cursor = Cursor::Idle;
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.cursor, Cursor::Idle | Cursor::Ended)
    }

    pub fn dialogue(&self) -> Option<&str> {
        self.dialogue.as_deref()
    }

    pub fn graph(&self) -> &DialogueGraph {
        &self.graph
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandTable {
        &mut self.commands
    }

    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableStore {
        &mut self.variables
    }
}
