//! Iteration lookups: `curr_iter` and `key`.

use crate::context::ExecutionContext;
use crate::error::RenderError;
use crate::manager::ContextManager;
use mimeo_core::Atom;

fn context<'a>(
    manager: &'a mut ContextManager,
    name: Option<&str>,
) -> Result<&'a mut ExecutionContext, RenderError> {
    Ok(match name {
        Some(name) => manager.get_context(name)?,
        None => manager.current_context_mut()?,
    })
}

/// Id of the current iteration of the named (or current) context.
pub fn curr_iter(manager: &mut ContextManager, name: Option<&str>) -> Result<Atom, RenderError> {
    let context = context(manager, name)?;
    Ok(Atom::from(context.curr_iteration()?.id()))
}

/// Key of an iteration of the named (or current) context.
pub fn key(
    manager: &mut ContextManager,
    name: Option<&str>,
    iteration: Option<u64>,
) -> Result<Atom, RenderError> {
    let context = context(manager, name)?;
    let iteration = match iteration {
        Some(id) => context.get_iteration(id)?,
        None => context.curr_iteration()?,
    };
    Ok(Atom::from(iteration.key()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContextError;

    #[test]
    fn test_curr_iter_and_key() {
        let mut manager = ContextManager::default();
        let mut session = manager.start_session();
        session.set_current_context("Parent").unwrap();
        let first_key = session.next_iteration().unwrap().key().to_string();
        session.next_iteration().unwrap();

        assert_eq!(curr_iter(&mut session, None).unwrap(), Atom::from(2u64));
        assert_eq!(key(&mut session, None, Some(1)).unwrap(), Atom::from(first_key.as_str()));

        session.set_current_context("Child").unwrap();
        session.next_iteration().unwrap();
        assert_eq!(curr_iter(&mut session, None).unwrap(), Atom::from(1u64));
        assert_eq!(curr_iter(&mut session, Some("Parent")).unwrap(), Atom::from(2u64));
        assert_ne!(
            key(&mut session, None, None).unwrap(),
            key(&mut session, Some("Parent"), None).unwrap()
        );
    }

    #[test]
    fn test_key_unknown_iteration() {
        let mut manager = ContextManager::default();
        let mut session = manager.start_session();
        session.set_current_context("A").unwrap();
        session.next_iteration().unwrap();

        assert!(matches!(
            key(&mut session, None, Some(5)),
            Err(RenderError::Context(ContextError::IterationNotFound { iteration: 5, .. }))
        ));
    }

    #[test]
    fn test_curr_iter_uninitialized() {
        let mut manager = ContextManager::default();
        let mut session = manager.start_session();
        session.set_current_context("A").unwrap();

        assert!(matches!(
            curr_iter(&mut session, Some("Other")),
            Err(RenderError::Context(ContextError::UninitializedIteration(_)))
        ));
    }
}
