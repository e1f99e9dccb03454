use std::collections::{HashMap, HashSet};

use dlg_core::{
    Arm, Branch, BranchId, DialogueError, DialogueGraph, DialogueOption, ErrorKind, Line, LineId,
    OptionId,
};

use crate::expression::ExpressionParser;
use crate::inline::{branch_condition, parse_line, parse_option};
use crate::source_line::{LineKind, SourceLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node {
    Line(LineId),
    Option(OptionId),
    Branch(BranchId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Previous {
    Nothing,
    Declaration,
    Line,
    Option,
    Branch,
}

/// Indentation-driven compiler state. Each source line is one transition.
pub(crate) struct CompilerState<'a> {
    parser: ExpressionParser<'a>,
    graph: DialogueGraph,
    declared: HashSet<String>,
    dialogue: Option<String>,
    previous: Previous,
    /// Lines waiting for their successor.
    line_stack: Vec<LineId>,
    /// Lines left behind by a shallower line; linked forward later.
    orphans: Vec<LineId>,
    option_stack: Vec<OptionId>,
    branch_stack: Vec<BranchId>,
    indents: HashMap<Node, usize>,
}

fn structure(message: impl Into<String>) -> DialogueError {
    DialogueError::new(ErrorKind::Structure(message.into()))
}

impl<'a> CompilerState<'a> {
    pub(crate) fn new(parser: ExpressionParser<'a>) -> Self {
        Self {
            parser,
            graph: DialogueGraph::new(),
            declared: HashSet::new(),
            dialogue: None,
            previous: Previous::Nothing,
            line_stack: Vec::new(),
            orphans: Vec::new(),
            option_stack: Vec::new(),
            branch_stack: Vec::new(),
            indents: HashMap::new(),
        }
    }

    pub(crate) fn apply(&mut self, line: &SourceLine<'_>) -> Result<(), DialogueError> {
        log::trace!(
            "line {} indent {} {:?}: {}",
            line.number,
            line.indent,
            line.kind,
            line.content
        );
        self.close_branches_deeper_than(line.indent);

        match line.kind {
            LineKind::Declaration => self.declaration(line),
            LineKind::Option => self.option(line),
            LineKind::IfBranch => self.if_branch(line),
            LineKind::ElseBranch => self.else_branch(line),
            LineKind::Line => self.line(line),
        }
    }

    pub(crate) fn finish(mut self) -> Result<DialogueGraph, DialogueError> {
        self.seal_dialogue();
        if self.graph.dialogue_count() == 0 {
            return Err(DialogueError::new(ErrorKind::EmptyScript));
        }
        log::debug!(
            "compiled {} dialogue(s) into {} line(s)",
            self.graph.dialogue_count(),
            self.graph.line_count()
        );
        Ok(self.graph)
    }

    fn declaration(&mut self, line: &SourceLine<'_>) -> Result<(), DialogueError> {
        let title = line.content[1..].trim();
        if title.is_empty() {
            return Err(structure("dialogue declaration has no identifier"));
        }
        self.seal_dialogue();
        if !self.declared.insert(title.to_string()) {
            return Err(structure(format!("dialogue `{}` is declared twice", title)));
        }

        self.line_stack.clear();
        self.orphans.clear();
        self.option_stack.clear();
        self.branch_stack.clear();
        self.indents.clear();
        self.dialogue = Some(title.to_string());
        self.previous = Previous::Declaration;
        Ok(())
    }

    fn option(&mut self, line: &SourceLine<'_>) -> Result<(), DialogueError> {
        let parts = parse_option(line.content)?;
        let commands = match parts.command_block {
            Some(block) => self.parser.parse_commands(block)?,
            None => Vec::new(),
        };
        let conditions = match parts.condition_source {
            Some(source) => self.parser.parse_conditions(source)?,
            None => Vec::new(),
        };

        self.orphan_lines_deeper_than(line.indent);
        if !matches!(self.previous, Previous::Line | Previous::Option) {
            return Err(structure("an option must follow a line or another option"));
        }
        let root = self
            .line_stack
            .last()
            .copied()
            .ok_or_else(|| structure("an option must follow a line or another option"))?;
        if self.indent(Node::Line(root)) != line.indent {
            return Err(structure(
                "an option must be indented like the line it belongs to",
            ));
        }

        let mut option = DialogueOption::new(parts.text, root);
        option.conditions = conditions;
        option.commands = commands;
        let option = self.graph.add_option(option);
        self.graph.line_mut(root).options.push(option);

        if self.previous == Previous::Option {
            if let Some(bodiless) = self.option_stack.pop() {
                self.relay_after_option(bodiless);
            }
        }
        self.close_options_from(line.indent);

        if !parts.terminal {
            self.indents.insert(Node::Option(option), line.indent);
            self.option_stack.push(option);
            self.previous = Previous::Option;
        }
        Ok(())
    }

    fn if_branch(&mut self, line: &SourceLine<'_>) -> Result<(), DialogueError> {
        let title = self.current_dialogue()?;
        let misplaced = match self.previous {
            Previous::Declaration => line.indent != 0,
            Previous::Line => self.top_line_indent()? != line.indent,
            Previous::Option => self.top_option_indent()? + 1 != line.indent,
            Previous::Nothing | Previous::Branch => {
                return Err(structure(
                    "a branch must follow a declaration, a line or an option",
                ))
            }
        };
        if misplaced {
            return Err(structure("branch is not indented correctly"));
        }

        let source = branch_condition(line.content)?
            .ok_or_else(|| structure("`(if)` is missing its condition"))?;
        let conditions = self.parser.parse_conditions(source)?;
        let branch = self.graph.add_branch(Branch {
            arms: vec![Arm {
                conditions,
                body: None,
            }],
        });
        self.indents.insert(Node::Branch(branch), line.indent);
        self.branch_stack.push(branch);

        match self.previous {
            Previous::Declaration => {
                let mut root = Line::relay();
                root.branch = Some(branch);
                let root = self.graph.add_line(root);
                self.graph.insert_entry(title, root);
            }
            Previous::Option => {
                if let Some(&option) = self.option_stack.last() {
                    self.graph.option_mut(option).branch = Some(branch);
                }
            }
            _ => {
                if let Some(&owner) = self.line_stack.last() {
                    self.graph.line_mut(owner).branch = Some(branch);
                }
            }
        }

        self.orphan_lines_deeper_than(line.indent);
        self.close_options_from(line.indent);
        self.previous = Previous::Branch;
        Ok(())
    }

    fn else_branch(&mut self, line: &SourceLine<'_>) -> Result<(), DialogueError> {
        let source = branch_condition(line.content)?;
        let branch = match self.branch_stack.last() {
            Some(&branch) if self.indent(Node::Branch(branch)) == line.indent => branch,
            _ => {
                return Err(structure(
                    "`(else)` has no open `(if)` at its indentation",
                ))
            }
        };
        if !matches!(self.previous, Previous::Line | Previous::Option) {
            return Err(structure("`(else)` must follow a line or an option"));
        }
        if self.graph.branch(branch).has_default_arm() {
            return Err(structure("`(else)` follows an unconditional `(else)`"));
        }

        let conditions = match source {
            Some(source) => self.parser.parse_conditions(source)?,
            None => Vec::new(),
        };
        self.graph.branch_mut(branch).arms.push(Arm {
            conditions,
            body: None,
        });

        self.orphan_lines_deeper_than(line.indent);
        self.close_options_from(line.indent);
        self.previous = Previous::Branch;
        Ok(())
    }

    fn line(&mut self, line: &SourceLine<'_>) -> Result<(), DialogueError> {
        let title = self.current_dialogue()?;
        let indent = line.indent;

        if self.previous == Previous::Option {
            if let Some(&option) = self.option_stack.last() {
                if self.indent(Node::Option(option)) >= indent {
                    self.relay_after_option(option);
                    self.previous = Previous::Line;
                }
            }
        }

        let misplaced = match self.previous {
            Previous::Declaration => indent != 0,
            Previous::Line => {
                self.top_line_indent()? != indent && !self.within_open_scope(indent)
            }
            Previous::Branch => self.top_branch_indent()? + 1 != indent,
            Previous::Option => self.top_option_indent()? + 1 != indent,
            Previous::Nothing => true,
        };
        if misplaced {
            return Err(structure("line is not indented correctly"));
        }

        if let Some(&branch) = self.branch_stack.last() {
            if self.indent(Node::Branch(branch)) == indent {
                self.branch_stack.pop();
                if !self.graph.branch(branch).has_default_arm() {
                    self.close_dead_end(branch);
                }
            }
        }

        let parts = parse_line(line.content)?;
        let commands = match parts.command_block {
            Some(block) => self.parser.parse_commands(block)?,
            None => Vec::new(),
        };
        let mut spoken = Line::spoken(parts.speaker, parts.text);
        spoken.expression = parts.expression;
        spoken.commands = commands;
        let id = self.graph.add_line(spoken);
        self.indents.insert(Node::Line(id), indent);

        match self.previous {
            Previous::Declaration => self.graph.insert_entry(title, id),
            Previous::Line => {
                let previous = self
                    .line_stack
                    .pop()
                    .ok_or_else(|| structure("line is not indented correctly"))?;
                self.graph.line_mut(previous).next = Some(id);
                while let Some(&orphan) = self.orphans.last() {
                    if self.indent(Node::Line(orphan)) < indent {
                        break;
                    }
                    self.orphans.pop();
                    self.graph.line_mut(orphan).next = Some(id);
                }
            }
            Previous::Option => {
                if let Some(&option) = self.option_stack.last() {
                    self.graph.option_mut(option).next = Some(id);
                }
            }
            Previous::Branch => {
                if let Some(&branch) = self.branch_stack.last() {
                    if let Some(arm) = self.graph.branch_mut(branch).arms.last_mut() {
                        arm.body = Some(id);
                    }
                }
            }
            Previous::Nothing => {}
        }

        self.orphan_lines_deeper_than(indent);
        self.close_options_from(indent);

        if parts.return_depth > 0 {
            let target = self.return_target(parts.return_depth)?;
            self.graph.line_mut(id).next = Some(target);
        } else {
            self.line_stack.push(id);
        }

        while let Some(&orphan) = self.orphans.last() {
            let orphan_indent = self.indent(Node::Line(orphan));
            if orphan_indent <= indent {
                break;
            }
            // An open option still owns deeper orphans it is nested in.
            let claimed_by_option = self.option_stack.last().is_some_and(|&option| {
                let option_indent = self.indent(Node::Option(option));
                option_indent < indent && option_indent < orphan_indent
            });
            if claimed_by_option {
                break;
            }
            self.orphans.pop();
            self.graph.line_mut(orphan).next = Some(id);
        }

        self.previous = Previous::Line;
        Ok(())
    }

    fn current_dialogue(&self) -> Result<String, DialogueError> {
        self.dialogue
            .clone()
            .ok_or_else(|| structure("dialogue declaration is missing"))
    }

    /// Root line of the option `depth` levels up from the innermost open one.
    fn return_target(&self, depth: usize) -> Result<LineId, DialogueError> {
        let position = self
            .option_stack
            .len()
            .checked_sub(depth)
            .ok_or_else(|| {
                structure(format!(
                    "return marker goes {} option level(s) up but only {} are open",
                    depth,
                    self.option_stack.len()
                ))
            })?;
        Ok(self.graph.option(self.option_stack[position]).root)
    }

    /// Whether a line at `indent` sits within one level of the innermost
    /// open branch or option.
    fn within_open_scope(&self, indent: usize) -> bool {
        let near = |scope: Option<usize>| scope.is_some_and(|scope| scope.abs_diff(indent) <= 1);
        near(
            self.branch_stack
                .last()
                .map(|&branch| self.indent(Node::Branch(branch))),
        ) || near(
            self.option_stack
                .last()
                .map(|&option| self.indent(Node::Option(option))),
        )
    }

    fn relay_after_option(&mut self, option: OptionId) {
        let relay = self.graph.add_line(Line::relay());
        self.graph.option_mut(option).next = Some(relay);
        let depth = self.indent(Node::Option(option)) + 1;
        self.indents.insert(Node::Line(relay), depth);
        self.orphans.push(relay);
    }

    /// Gives a branch without an unconditional arm a relay default arm.
    fn close_dead_end(&mut self, branch: BranchId) {
        let relay = self.graph.add_line(Line::relay());
        self.graph.branch_mut(branch).arms.push(Arm {
            conditions: Vec::new(),
            body: Some(relay),
        });
        let depth = self.indent(Node::Branch(branch)) + 1;
        self.indents.insert(Node::Line(relay), depth);
        self.line_stack.push(relay);
        self.previous = Previous::Line;
        self.close_options_from(depth);
    }

    fn close_branches_deeper_than(&mut self, indent: usize) {
        while let Some(&branch) = self.branch_stack.last() {
            if self.indent(Node::Branch(branch)) <= indent {
                break;
            }
            self.branch_stack.pop();
            if !self.graph.branch(branch).has_default_arm() {
                self.close_dead_end(branch);
            }
        }
    }

    fn close_options_from(&mut self, indent: usize) {
        while let Some(&option) = self.option_stack.last() {
            if self.indent(Node::Option(option)) < indent {
                break;
            }
            self.option_stack.pop();
        }
    }

    fn orphan_lines_deeper_than(&mut self, indent: usize) {
        while let Some(&line) = self.line_stack.last() {
            if self.indent(Node::Line(line)) <= indent {
                break;
            }
            self.line_stack.pop();
            self.orphans.push(line);
        }
    }

    /// Completes every branch left open at the end of a dialogue.
    fn seal_dialogue(&mut self) {
        while let Some(branch) = self.branch_stack.pop() {
            if !self.graph.branch(branch).has_default_arm() {
                self.close_dead_end(branch);
            }
        }
        if let Some(title) = &self.dialogue {
            if !self.graph.contains_dialogue(title) {
                log::warn!("dialogue `{}` has no lines and is skipped", title);
            }
        }
    }

    fn indent(&self, node: Node) -> usize {
        self.indents.get(&node).copied().unwrap_or_default()
    }

    fn top_line_indent(&self) -> Result<usize, DialogueError> {
        self.line_stack
            .last()
            .map(|&line| self.indent(Node::Line(line)))
            .ok_or_else(|| structure("line is not indented correctly"))
    }

    fn top_option_indent(&self) -> Result<usize, DialogueError> {
        self.option_stack
            .last()
            .map(|&option| self.indent(Node::Option(option)))
            .ok_or_else(|| structure("no open option at this indentation"))
    }

    fn top_branch_indent(&self) -> Result<usize, DialogueError> {
        self.branch_stack
            .last()
            .map(|&branch| self.indent(Node::Branch(branch)))
            .ok_or_else(|| structure("no open branch at this indentation"))
    }
}
