//! Tokens: the values that travel along the edges of a pipeline.
//!
//! A token is either a payload owned by whichever stage currently holds it, or
//! one of three control values the driver intercepts. The control values are
//! enum variants rather than reserved payload values, so a payload can never be
//! mistaken for one.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A unit of work, or a control signal, passed from one stage to the next.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Token<T> {
    /// Ordinary work, moved from producer to consumer.
    Payload(T),
    /// Bubble: the consuming stage is skipped this cycle and re-emits its
    /// latch's placeholder instead.
    Noop,
    /// Go-ahead without a payload.
    ///
    /// Pre-loaded on the last stage's latch so the first stage has something to
    /// consume on cycle 1. A stage receives it as `None`.
    Bootstrap,
    /// Permanent end of stream.
    Terminate,
}

/// The class of a token, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// [`Token::Payload`].
    Payload,
    /// [`Token::Noop`].
    Noop,
    /// [`Token::Bootstrap`].
    Bootstrap,
    /// [`Token::Terminate`].
    Terminate,
}

/// The control value a latch re-emits when its stage skipped a cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placeholder {
    /// Forward the bubble downstream.
    #[default]
    Noop,
    /// Turn the bubble into a go-ahead for the next stage.
    Bootstrap,
}

impl<T> Token<T> {
    /// Returns the class of this token.
    #[inline]
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Payload(_) => TokenKind::Payload,
            Token::Noop => TokenKind::Noop,
            Token::Bootstrap => TokenKind::Bootstrap,
            Token::Terminate => TokenKind::Terminate,
        }
    }

    /// Returns `true` for the three control values.
    #[inline]
    pub fn is_control(&self) -> bool {
        !matches!(self, Token::Payload(_))
    }

    /// Returns `true` for [`Token::Terminate`].
    #[inline]
    pub fn is_terminate(&self) -> bool {
        matches!(self, Token::Terminate)
    }

    /// Borrows the payload, if any.
    #[inline]
    pub fn payload(&self) -> Option<&T> {
        match self {
            Token::Payload(value) => Some(value),
            _ => None,
        }
    }

    /// Takes the payload out of the token, dropping control values.
    #[inline]
    pub fn into_payload(self) -> Option<T> {
        match self {
            Token::Payload(value) => Some(value),
            _ => None,
        }
    }

    /// Maps the payload, passing control values through unchanged.
    #[inline]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Token<U> {
        match self {
            Token::Payload(value) => Token::Payload(f(value)),
            Token::Noop => Token::Noop,
            Token::Bootstrap => Token::Bootstrap,
            Token::Terminate => Token::Terminate,
        }
    }
}

impl<T> From<Placeholder> for Token<T> {
    #[inline]
    fn from(placeholder: Placeholder) -> Self {
        match placeholder {
            Placeholder::Noop => Token::Noop,
            Placeholder::Bootstrap => Token::Bootstrap,
        }
    }
}

impl<T> From<Option<T>> for Token<T> {
    /// `Some` becomes a payload; `None` ends the stream.
    #[inline]
    fn from(value: Option<T>) -> Self {
        value.map_or(Token::Terminate, Token::Payload)
    }
}

impl<T: fmt::Debug> fmt::Debug for Token<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Payload(value) => f.debug_tuple("Payload").field(value).finish(),
            Token::Noop => f.write_str("Noop"),
            Token::Bootstrap => f.write_str("Bootstrap"),
            Token::Terminate => f.write_str("Terminate"),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenKind::Payload => "payload",
            TokenKind::Noop => "noop",
            TokenKind::Bootstrap => "bootstrap",
            TokenKind::Terminate => "terminate",
        })
    }
}
