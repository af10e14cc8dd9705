/// Outcome of an async question
///
/// A timeout is a normal outcome, not an error, and stays distinguishable
/// from an answer whose payload happens to be `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer<T> {
    Answered(T),
    TimedOut,
}

impl<T> Answer<T> {
    pub fn is_answered(&self) -> bool {
        matches!(self, Answer::Answered(_))
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Answer::TimedOut)
    }

    pub fn answered(self) -> Option<T> {
        match self {
            Answer::Answered(value) => Some(value),
            Answer::TimedOut => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Answer<U> {
        match self {
            Answer::Answered(value) => Answer::Answered(f(value)),
            Answer::TimedOut => Answer::TimedOut,
        }
    }
}

impl Answer<bool> {
    /// True only for an affirmative answer; a timeout reads as "no"
    pub fn is_yes(&self) -> bool {
        matches!(self, Answer::Answered(true))
    }
}
