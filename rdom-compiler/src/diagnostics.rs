use crate::options::CompilerOptions;
use crate::template_ast::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Renders the message, suffixed with a 1-based position when known.
    pub fn render(&self, source: &str) -> String {
        match self.span {
            Some(span) => {
                let (line, column) = line_column(source, span.start);
                format!("{} (line {line}, column {column})", self.message)
            }
            None => self.message.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub tips: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn error(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.errors.push(Diagnostic {
            message: message.into(),
            span,
        });
    }

    pub fn tip(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.tips.push(Diagnostic {
            message: message.into(),
            span,
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `(errors, tips)` as display strings.
    pub fn render(&self, source: &str) -> (Vec<String>, Vec<String>) {
        (
            self.errors.iter().map(|d| d.render(source)).collect(),
            self.tips.iter().map(|d| d.render(source)).collect(),
        )
    }
}

/// Per-call state threaded through parse, optimize and generate.
pub struct CompileContext<'o> {
    pub options: &'o CompilerOptions,
    pub diagnostics: Diagnostics,
}

impl<'o> CompileContext<'o> {
    pub fn new(options: &'o CompilerOptions) -> Self {
        CompileContext {
            options,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn error(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.diagnostics.error(message, span);
    }

    pub fn tip(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.diagnostics.tip(message, span);
    }
}

fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
