//! Select options backed by a master repository.

use tracing::warn;

use crate::deferred::Deferred;
use crate::repository::MasterRepository;
use crate::ui::{OptionSpec, UiNode};

/// Replace `select`'s options with `build(repo)` once `repo` is loaded.
///
/// A repository that is still loading is waited on. One that was never
/// loaded is loaded empty. The returned deferred settles after the options
/// have been replaced, or rejects when the load times out.
pub fn publish_options<T, F>(select: &UiNode, repo: &MasterRepository<T>, build: F) -> Deferred<()>
where
    T: Clone + PartialEq + Default + 'static,
    F: FnOnce(&MasterRepository<T>) -> Vec<OptionSpec> + 'static,
{
    let published = Deferred::new();

    let node = select.clone();
    let source = repo.clone();
    let done = published.clone();
    repo.load(Vec::new()).always(move |result| match result {
        Ok(()) => {
            node.set_options(&build(&source));
            done.resolve(());
        }
        Err(err) => {
            warn!(node = %node.name(), %err, "options not published");
            done.reject(err.clone());
        }
    });

    published
}
