use super::*;

impl DialogueEngine {
    /// Advances the session and returns what should be shown next.
    ///
    /// Presenting a line runs its commands once, even when presenting it
    /// fails and is retried. While a choice is pending
    /// the same choices are returned until `choose` is called.
    pub fn next_output(&mut self) -> Result<DialogueOutput, DialogueError> {
        loop {
            match &self.cursor {
                Cursor::Idle => {
                    return Err(DialogueError::session("no dialogue has been started"))
                }
                Cursor::Ended => return Ok(DialogueOutput::End),
                Cursor::AwaitingChoice { view, items, .. } => {
                    return Ok(DialogueOutput::Choices {
                        line: view.clone(),
                        items: items.clone(),
                    })
                }
                Cursor::Shown(line) => {
                    let line = *line;
                    let next = Walker::new(&self.commands, &mut self.variables)
                        .next_after(&self.graph, line)?;
                    self.cursor = next.map_or(Cursor::Ended, Cursor::At);
                }
                Cursor::At(line) => {
                    let line = *line;
                    Walker::new(&self.commands, &mut self.variables)
                        .run_commands(&self.graph.line(line).commands)?;
                    self.cursor = Cursor::Prepared(line);
                }
                Cursor::Prepared(line) => {
                    let line = *line;
                    return self.present(line);
                }
            }
        }
    }

    fn present(&mut self, line: LineId) -> Result<DialogueOutput, DialogueError> {
        let mut available = Vec::new();
        {
            let mut walker = Walker::new(&self.commands, &mut self.variables);
            for &option in &self.graph.line(line).options {
                if walker.is_option_available(&self.graph, option)? {
                    available.push(option);
                }
            }
        }

        let view = self.line_view(line)?;
        if available.is_empty() {
            self.cursor = Cursor::Shown(line);
            return Ok(DialogueOutput::Line(view));
        }

        let items = available
            .into_iter()
            .enumerate()
            .map(|(index, option)| self.choice_item(index, option))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("line {} offers {} choice(s)", line.index(), items.len());
        self.cursor = Cursor::AwaitingChoice {
            line,
            view: view.clone(),
            items: items.clone(),
        };
        Ok(DialogueOutput::Choices { line: view, items })
    }

    fn line_view(&self, line: LineId) -> Result<LineView, DialogueError> {
        let current = self.graph.line(line);
        Ok(LineView {
            speaker: current.speaker.clone().unwrap_or_default(),
            text: interpolate(current.text.as_deref().unwrap_or_default(), &self.variables)?,
            expression: current.expression.clone(),
        })
    }

    fn choice_item(&self, index: usize, option: OptionId) -> Result<ChoiceItem, DialogueError> {
        let entry = self.graph.option(option);
        Ok(ChoiceItem {
            index,
            option,
            text: interpolate(&entry.text, &self.variables)?,
            was_selected: entry.was_selected,
        })
    }
}
