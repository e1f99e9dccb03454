use dlg_core::{
    BranchId, CommandCall, CommandTable, Condition, DialogueError, DialogueGraph, ErrorKind,
    LineId, OptionId, Value, VariableStore,
};

/// Upper bound on relay lines crossed by one resolution.
pub const TRAVERSAL_GUARD: usize = 10_000;

/// Traversal over a compiled graph. Conditions and commands run against
/// the borrowed command table and variable store.
pub struct Walker<'a> {
    commands: &'a CommandTable,
    variables: &'a mut VariableStore,
}

impl<'a> Walker<'a> {
    pub fn new(commands: &'a CommandTable, variables: &'a mut VariableStore) -> Self {
        Self {
            commands,
            variables,
        }
    }

    /// The line presented after `line`. A branch on the line takes
    /// precedence over its `next` link.
    pub fn next_after(
        &mut self,
        graph: &DialogueGraph,
        line: LineId,
    ) -> Result<Option<LineId>, DialogueError> {
        let current = graph.line(line);
        match current.branch {
            Some(branch) => self.branch_next(graph, branch),
            None => self.resolve(graph, current.next),
        }
    }

    /// Body of the first arm whose conditions all hold, resolved through
    /// relay lines.
    pub fn branch_next(
        &mut self,
        graph: &DialogueGraph,
        branch: BranchId,
    ) -> Result<Option<LineId>, DialogueError> {
        let body = self.select_arm(graph, branch)?;
        self.resolve(graph, body)
    }

    /// Skips relay lines from `start` until a line with text is reached.
    /// A relay that carries a branch continues through that branch.
    pub fn resolve(
        &mut self,
        graph: &DialogueGraph,
        start: Option<LineId>,
    ) -> Result<Option<LineId>, DialogueError> {
        let mut current = start;
        for _ in 0..TRAVERSAL_GUARD {
            let Some(id) = current else {
                return Ok(None);
            };
            let line = graph.line(id);
            if !line.is_relay() {
                log::debug!("resolved line {}", id.index());
                return Ok(Some(id));
            }
            current = match line.branch {
                Some(branch) => self.select_arm(graph, branch)?,
                None => line.next,
            };
        }
        Err(DialogueError::new(ErrorKind::TraversalGuard(TRAVERSAL_GUARD)))
    }

    pub fn is_option_available(
        &mut self,
        graph: &DialogueGraph,
        option: OptionId,
    ) -> Result<bool, DialogueError> {
        self.conditions_hold(&graph.option(option).conditions)
    }

    /// Runs the option's commands, marks it selected and returns where the
    /// dialogue continues. `None` ends the dialogue.
    pub fn select_option(
        &mut self,
        graph: &mut DialogueGraph,
        option: OptionId,
    ) -> Result<Option<LineId>, DialogueError> {
        self.run_commands(&graph.option(option).commands)?;
        graph.option_mut(option).was_selected = true;

        let selected = graph.option(option);
        match selected.branch {
            Some(branch) => self.branch_next(graph, branch),
            None => self.resolve(graph, selected.next),
        }
    }

    pub fn run_commands(&mut self, calls: &[CommandCall]) -> Result<(), DialogueError> {
        for call in calls {
            self.commands.call(call, self.variables)?;
        }
        Ok(())
    }

    pub fn evaluate(&mut self, condition: &Condition) -> Result<bool, DialogueError> {
        match self.commands.call(&condition.call, self.variables)? {
            Some(Value::Boolean(result)) => Ok(result),
            other => Err(DialogueError::new(ErrorKind::NonBooleanCondition {
                name: condition.call.name.clone(),
                found: other
                    .map(|value| value.type_name().to_string())
                    .unwrap_or_else(|| "nothing".to_string()),
            })),
        }
    }

    fn conditions_hold(&mut self, conditions: &[Condition]) -> Result<bool, DialogueError> {
        for condition in conditions {
            if !self.evaluate(condition)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn select_arm(
        &mut self,
        graph: &DialogueGraph,
        branch: BranchId,
    ) -> Result<Option<LineId>, DialogueError> {
        for (index, arm) in graph.branch(branch).arms.iter().enumerate() {
            if self.conditions_hold(&arm.conditions)? {
                log::debug!("branch {} selected arm {}", branch.index(), index);
                return Ok(arm.body);
            }
        }
        Err(DialogueError::new(ErrorKind::NoApplicableArm))
    }
}
