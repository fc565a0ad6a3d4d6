use crate::api::UploadReceipt;
use std::convert::TryFrom;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Pending,
    Success(String),
    Error(String),
}

impl UploadStatus {
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Pending => Some("Uploading..."),
            Self::Success(message) | Self::Error(message) => Some(message),
        }
    }

    /// Applies `event`, leaving the status untouched when the transition is
    /// not allowed.
    pub fn process(&mut self, event: &UploadEvent) -> Result<(), StateTransitionError> {
        let NextStatus(next) = NextStatus::try_from((&*self, event))?;
        *self = next;
        Ok(())
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Pending => write!(f, "Pending"),
            Self::Success(_) => write!(f, "Success"),
            Self::Error(_) => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Start,
    /// Failed locally before any request was sent.
    Rejected(String),
    Succeeded(UploadReceipt),
    Failed(String),
    Dismiss,
}

impl fmt::Display for UploadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Rejected(msg) => write!(f, "Rejected({msg})"),
            Self::Succeeded(receipt) => write!(f, "Succeeded({})", receipt.inserted_count),
            Self::Failed(msg) => write!(f, "Failed({msg})"),
            Self::Dismiss => write!(f, "Dismiss"),
        }
    }
}

#[derive(Debug)]
pub struct StateTransitionError {
    from: UploadStatus,
    event: UploadEvent,
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} with event {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for StateTransitionError {}

struct NextStatus(UploadStatus);

impl TryFrom<(&UploadStatus, &UploadEvent)> for NextStatus {
    type Error = StateTransitionError;

    fn try_from(value: (&UploadStatus, &UploadEvent)) -> Result<Self, Self::Error> {
        let (current, event) = value;

        match (current, event) {
            (UploadStatus::Pending, UploadEvent::Succeeded(receipt)) => {
                Ok(Self(UploadStatus::Success(receipt.success_message())))
            }
            (UploadStatus::Pending, UploadEvent::Failed(message)) => {
                Ok(Self(UploadStatus::Error(message.clone())))
            }
            (UploadStatus::Pending, _) => Err(StateTransitionError {
                from: current.clone(),
                event: event.clone(),
            }),
            (_, UploadEvent::Start) => Ok(Self(UploadStatus::Pending)),
            (_, UploadEvent::Rejected(message)) => Ok(Self(UploadStatus::Error(message.clone()))),
            (UploadStatus::Success(_) | UploadStatus::Error(_), UploadEvent::Dismiss) => {
                Ok(Self(UploadStatus::Idle))
            }
            _ => Err(StateTransitionError {
                from: current.clone(),
                event: event.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_upload_reports_count() {
        let mut status = UploadStatus::default();
        status.process(&UploadEvent::Start).unwrap();
        assert!(status.is_pending());
        status
            .process(&UploadEvent::Succeeded(UploadReceipt { inserted_count: 7 }))
            .unwrap();
        assert_eq!(
            status.message(),
            Some("Success! 7 records updated. Refreshing charts...")
        );
    }

    #[test]
    fn second_start_while_pending_is_rejected() {
        let mut status = UploadStatus::Pending;
        let err = status.process(&UploadEvent::Start).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid transition from Pending with event Start"
        );
        assert!(status.is_pending());
    }

    #[test]
    fn validation_error_needs_no_request() {
        let mut status = UploadStatus::Idle;
        status
            .process(&UploadEvent::Rejected("Please select a valid .csv file.".into()))
            .unwrap();
        assert_eq!(
            status,
            UploadStatus::Error("Please select a valid .csv file.".into())
        );
        status.process(&UploadEvent::Dismiss).unwrap();
        assert_eq!(status, UploadStatus::Idle);
    }

    #[test]
    fn completion_without_start_is_invalid() {
        let mut status = UploadStatus::Idle;
        assert!(status.process(&UploadEvent::Failed("boom".into())).is_err());
        assert!(status.process(&UploadEvent::Dismiss).is_err());
    }
}
