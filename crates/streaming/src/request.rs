/// Identifies one panorama load.
///
/// Issued in strictly increasing order by the presenter, so "is this the
/// latest request" is a plain comparison.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Request(pub u64);

impl Request {
    pub fn next(self) -> Self {
        Request(self.0 + 1)
    }
}
