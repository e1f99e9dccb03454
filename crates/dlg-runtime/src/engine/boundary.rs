use super::*;

impl DialogueEngine {
    /// Selects the pending choice at `index` of the presented list.
    pub fn choose(&mut self, index: usize) -> Result<(), DialogueError> {
        let Cursor::AwaitingChoice { line, items, .. } = &self.cursor else {
            return Err(DialogueError::session("no choice is pending"));
        };
        let Some(item) = items.get(index) else {
            return Err(DialogueError::session(format!(
                "choice index {} is out of range ({} available)",
                index,
                items.len()
            )));
        };
        let option = item.option;
        log::debug!("line {} chose option {}", line.index(), option.index());

        let next = Walker::new(&self.commands, &mut self.variables)
            .select_option(&mut self.graph, option)?;
        self.cursor = next.map_or(Cursor::Ended, Cursor::At);
        Ok(())
    }

    pub fn pending_choices(&self) -> Option<&[ChoiceItem]> {
        match &self.cursor {
            Cursor::AwaitingChoice { items, .. } => Some(items),
            _ => None,
        }
    }
}
