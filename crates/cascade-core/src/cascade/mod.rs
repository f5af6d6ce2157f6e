//! Cascading create and delete orchestration.
//!
//! [`CascadeEngine`] wraps the raw executor of one entity type. Creates strip
//! nested relation payloads, insert the flat records in one call, match the
//! inserted rows back to their inputs, then fan out one bulk create per
//! cascading relation. Deletes snapshot the matching rows, delete them, then
//! fan out one bulk delete per relation named in the inclusion list.
//!
//! Recursion happens by composition: each branch calls the target type's own
//! [`crate::Repository`], which cascades again when the target supports it.

mod create;
mod delete;
mod engine;
pub mod inclusion;
pub mod matcher;

use std::future::Future;

use futures::future::join_all;

use crate::config::{CascadeConfig, FanOut};
use crate::error::Error;

pub use engine::CascadeEngine;

/// Run sibling branches to completion and collect their outcomes in order.
///
/// A failing branch never cancels its siblings.
async fn settle<F, T>(config: &CascadeConfig, branches: Vec<F>) -> Vec<T>
where
    F: Future<Output = T>,
{
    match config.fan_out {
        FanOut::Concurrent => join_all(branches).await,
        FanOut::Sequential => {
            let mut outcomes = Vec::with_capacity(branches.len());
            for branch in branches {
                outcomes.push(branch.await);
            }
            outcomes
        }
    }
}

/// Split settled outcomes into successes, keeping the first error in branch order.
fn first_error<T>(outcomes: Vec<Result<T, Error>>) -> (Vec<Option<T>>, Option<Error>) {
    let mut error = None;
    let values = outcomes
        .into_iter()
        .map(|outcome| match outcome {
            Ok(value) => Some(value),
            Err(e) => {
                error.get_or_insert(e);
                None
            }
        })
        .collect();
    (values, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_settle_keeps_order() {
        let branches: Vec<_> = (0..4).map(|i| async move { i * 10 }).collect();
        let outcomes = settle(&CascadeConfig::default(), branches).await;
        assert_eq!(outcomes, vec![0, 10, 20, 30]);
    }

    #[tokio::test]
    async fn test_sequential_runs_every_branch() {
        let started = Arc::new(AtomicUsize::new(0));
        let branches: Vec<_> = (0..3)
            .map(|i| {
                let started = started.clone();
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    if i == 1 {
                        Err(Error::storage("User", "boom"))
                    } else {
                        Ok(i)
                    }
                }
            })
            .collect();

        let outcomes = settle(&CascadeConfig::new().sequential(), branches).await;
        assert_eq!(started.load(Ordering::SeqCst), 3);

        let (values, error) = first_error(outcomes);
        assert_eq!(values, vec![Some(0), None, Some(2)]);
        assert!(error.unwrap().is_storage());
    }

    #[test]
    fn test_first_error_wins() {
        let outcomes: Vec<Result<u8, Error>> = vec![
            Ok(1),
            Err(Error::storage("Post", "first")),
            Err(Error::storage("Tag", "second")),
        ];
        let (_, error) = first_error(outcomes);
        assert!(error.unwrap().to_string().contains("first"));
    }
}
