pub mod domain;
pub mod pin;
pub mod ports;
pub mod schedule;

pub use domain::{
    first_unanswered, AssignedQuestion, InterviewSnapshot, InterviewStatus, SessionToken,
};
pub use pin::{PinAction, PinEntry};
pub use ports::{
    BackendService, Capabilities, Clock, MicStatus, PortError, PortResult, Presentation,
    RecognitionSignal, ReplayControl, Screen, SpeechRecognitionService, SpeechSynthesisService,
};
pub use schedule::{classify, TimePhase};
