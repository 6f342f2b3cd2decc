use bytes::Bytes;

/// How the payload arrived, so it leaves the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Text,
    Binary,
}

/// Opaque payload, forwarded and cached verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind:    FrameKind,
    payload: Bytes,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self { kind: FrameKind::Text, payload: Bytes::from(text.into()) }
    }

    pub fn binary(data: impl Into<Bytes>) -> Self {
        Self { kind: FrameKind::Binary, payload: data.into() }
    }

    pub fn kind(&self) -> FrameKind { self.kind }

    pub fn payload(&self) -> &Bytes { &self.payload }
}
