use chrono::{DateTime, Duration, Utc};

/// Fewest samples any sweep will take, whatever the requested count.
pub const MIN_SAMPLES: usize = 5;

/// `count` timestamps linearly spaced over `[start, end]`, both ends included.
///
/// The schedule is a plain value: every call to [`EvenSamples::iter`] starts
/// over from `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvenSamples {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    count: usize,
}

pub fn even_samples(start: DateTime<Utc>, end: DateTime<Utc>, count: usize) -> EvenSamples {
    EvenSamples {
        start,
        end,
        count: count.max(MIN_SAMPLES),
    }
}

/// One sample per `cadence` of the window's duration, floored at [`MIN_SAMPLES`].
pub fn samples_per_cadence(start: DateTime<Utc>, end: DateTime<Utc>, cadence: Duration) -> EvenSamples {
    let cadence_ms = cadence.num_milliseconds().max(1);
    let count = ((end - start).num_milliseconds() / cadence_ms).max(0) as usize;
    even_samples(start, end, count)
}

impl EvenSamples {
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> EvenSamplesIter {
        EvenSamplesIter {
            schedule: *self,
            index: 0,
        }
    }

    fn at(&self, index: usize) -> DateTime<Utc> {
        let span_ms = (self.end - self.start).num_milliseconds() as i128;
        let offset_ms = span_ms * index as i128 / (self.count - 1) as i128;
        self.start + Duration::milliseconds(offset_ms as i64)
    }
}

impl<'a> IntoIterator for &'a EvenSamples {
    type Item = DateTime<Utc>;
    type IntoIter = EvenSamplesIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct EvenSamplesIter {
    schedule: EvenSamples,
    index: usize,
}

impl Iterator for EvenSamplesIter {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.schedule.count {
            return None;
        }
        let t = if self.index + 1 == self.schedule.count {
            self.schedule.end
        } else {
            self.schedule.at(self.index)
        };
        self.index += 1;
        Some(t)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.schedule.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EvenSamplesIter {}

/// Fixed-cadence timestamps `start, start + step, ...` up to and including `end`.
pub fn stepped(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> impl Iterator<Item = DateTime<Utc>> + Clone {
    let step = if step <= Duration::zero() {
        Duration::seconds(1)
    } else {
        step
    };
    std::iter::successors(Some(start), move |t| Some(*t + step)).take_while(move |t| *t <= end)
}
