use alloc::{format, string::String};

use crate::parameter::AccessError;

/// Maximum number of components an address may contain.
pub const MAX_PATH_DEPTH: usize = 16;

/// Forward-only cursor over the components of an absolute address.
///
/// `"/Audio/gains/3"` yields `Audio`, `gains`, `3`. A single trailing
/// slash is tolerated; empty interior components are not.
#[derive(Debug, Clone)]
pub struct PathNavigator<'p> {
    tokens: heapless::Vec<&'p str, MAX_PATH_DEPTH>,
    cursor: usize,
}

impl<'p> PathNavigator<'p> {
    pub fn new(path: &'p str) -> Result<Self, AccessError> {
        let Some(rest) = path.strip_prefix('/') else {
            return Err(AccessError::invalid_format(format!(
                "Path must be absolute: {path}"
            )));
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        let mut tokens = heapless::Vec::new();
        if !rest.is_empty() {
            for token in rest.split('/') {
                if token.is_empty() {
                    return Err(AccessError::invalid_format(format!(
                        "Empty path component in {path}"
                    )));
                }
                tokens.push(token).map_err(|_| {
                    AccessError::invalid_format(format!(
                        "Path exceeds {MAX_PATH_DEPTH} components: {path}"
                    ))
                })?;
            }
        }

        Ok(Self { tokens, cursor: 0 })
    }

    /// Consumes the next component, which must be `name`.
    pub fn navigate_through(&mut self, name: &str) -> Result<(), AccessError> {
        match self.next() {
            Some(token) if token == name => Ok(()),
            _ => Err(AccessError::path_not_found(format!(
                "Path not found: {}",
                self.current_path()
            ))),
        }
    }

    /// The path consumed so far, always starting with `/`.
    pub fn current_path(&self) -> String {
        let mut path = String::new();
        for token in &self.tokens[..self.cursor] {
            path.push('/');
            path.push_str(token);
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }

    /// Number of components left to consume.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.cursor
    }
}

impl<'p> Iterator for PathNavigator<'p> {
    type Item = &'p str;

    /// Returns the next unconsumed component, or `None` once exhausted.
    fn next(&mut self) -> Option<&'p str> {
        let token = self.tokens.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(token)
    }
}
