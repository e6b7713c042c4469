mod stack;
mod truthy;

pub use stack::Stack;
pub use truthy::is_truthy;

use crate::{
    compile::{
        tree::{Partial, Section, Tree, Variable},
        Delimiters, Template,
    },
    log::{error_missing_variable, error_no_provider, error_write, Error},
    pipe::Pipe,
    value::{Lambda, Value},
};
use std::fmt::Write;
use tracing::debug;

/// Walks the tag tree of a [`Template`] and writes the output to a [`Pipe`].
pub struct Renderer<'a> {
    /// The template being rendered.
    template: &'a Template,
    /// The context that names are resolved against.
    stack: Stack<'a>,
}

impl<'a> Renderer<'a> {
    /// Create a new Renderer with one context frame per root.
    pub fn new(template: &'a Template, roots: &'a [Value]) -> Self {
        Self {
            template,
            stack: Stack::new(roots),
        }
    }

    /// Render the [`Template`] stored inside the [`Renderer`] into the buffer.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if rendering any of the [`Tree`] instances within
    /// the `Template` fails, or writing to the buffer fails.
    pub fn render(mut self, buffer: &mut dyn Write) -> Result<(), Error> {
        let template = self.template;
        let engine = template.engine();
        let mut pipe = Pipe::new(buffer, engine.escape(), engine.marshal());

        self.render_scope(&template.scope().data, &mut pipe)
    }

    /// Render each of the given [`Tree`] instances in order.
    fn render_scope(&mut self, trees: &[Tree], pipe: &mut Pipe<'_>) -> Result<(), Error> {
        for tree in trees {
            match tree {
                Tree::Text(text) => pipe.write_str(text).map_err(|_| error_write())?,
                Tree::Variable(variable) => self.render_variable(variable, pipe)?,
                Tree::Section(section) => self.render_section(section, pipe)?,
                Tree::Partial(partial) => self.render_partial(partial, pipe)?,
            }
        }

        Ok(())
    }

    fn render_variable(&mut self, variable: &Variable, pipe: &mut Pipe<'_>) -> Result<(), Error> {
        let Some(value) = self.stack.resolve(&variable.name)? else {
            if self.template.engine().errors() {
                return Err(error_missing_variable(&variable.name, variable.line));
            }
            return Ok(());
        };

        match value {
            Value::Lambda(lambda) => {
                let text = self.call_lambda(&lambda, "", &variable.delimiters)?;
                pipe.write_text(&text, variable.escaped)
            }
            value => pipe.write_value(&value, variable.escaped),
        }
    }

    /// Render a section or inverted section.
    ///
    /// Sequences render the body once per element, lambdas receive the raw
    /// body text, and any other truthy value is pushed as a single frame.
    fn render_section(&mut self, section: &Section, pipe: &mut Pipe<'_>) -> Result<(), Error> {
        let value = self.stack.resolve(&section.name)?;
        let truthy = is_truthy(value.as_ref());

        if section.inverted {
            if !truthy {
                self.render_scope(&section.scope.data, pipe)?;
            }
            return Ok(());
        }

        let Some(value) = value.filter(|_| truthy) else {
            return Ok(());
        };

        match value {
            Value::Sequence(items) => {
                for item in items {
                    self.stack.push(item);
                    let result = self.render_scope(&section.scope.data, pipe);
                    self.stack.pop();
                    result?;
                }
                Ok(())
            }
            Value::Lambda(lambda) => {
                let text = self.call_lambda(&lambda, &section.raw, &section.delimiters)?;
                pipe.write_str(&text).map_err(|_| error_write())
            }
            value => {
                self.stack.push(value);
                let result = self.render_scope(&section.scope.data, pipe);
                self.stack.pop();
                result
            }
        }
    }

    /// Load, indent, compile and render a partial against the current stack.
    fn render_partial(&mut self, partial: &Partial, pipe: &mut Pipe<'_>) -> Result<(), Error> {
        let engine = self.template.engine();
        let Some(provider) = engine.partials() else {
            return Err(error_no_provider(&partial.name, partial.line));
        };
        debug!(partial = %partial.name, "loading partial");

        let text = provider.get(&partial.name).map_err(|error| match error.line() {
            Some(_) => error,
            None => error.with_line(partial.line),
        })?;
        let text = indent(&text, &partial.indent);
        let template = engine
            .compile_partial(&text)
            .map_err(|error| error.with_name(&partial.name))?;

        self.render_scope(&template.scope().data, pipe)
    }

    /// Invoke a lambda with the given text.
    ///
    /// The lambda receives a callback that compiles a fragment with the given
    /// delimiters and renders it against the current stack.
    fn call_lambda(
        &mut self,
        lambda: &Lambda,
        text: &str,
        delimiters: &Delimiters,
    ) -> Result<String, Error> {
        debug!(text, "calling lambda");
        let engine = self.template.engine();

        let mut render = |fragment: &str| -> Result<String, Error> {
            let template = engine.compile_fragment(fragment, delimiters)?;
            let mut buffer = String::new();
            let mut pipe = Pipe::new(&mut buffer, engine.escape(), engine.marshal());
            self.render_scope(&template.scope().data, &mut pipe)?;

            Ok(buffer)
        };

        lambda.call(text, &mut render)
    }
}

/// Prefix every non-empty line of the text with the indent.
fn indent(text: &str, indent: &str) -> String {
    if indent.is_empty() {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line != "\n" && line != "\r\n" {
            result.push_str(indent);
        }
        result.push_str(line);
    }

    result
}
