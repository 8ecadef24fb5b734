mod bridge;

pub(crate) use bridge::attach;
