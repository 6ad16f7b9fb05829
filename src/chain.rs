use crate::error::{Error, Result};

/// Requests currently being resolved, outermost first.
#[derive(Debug, Default)]
pub struct CallChain {
    stack: Vec<String>,
}

impl CallChain {
    pub fn enter(&mut self, name: &str) -> Result<()> {
        if let Some(start) = self.stack.iter().position(|n| n == name) {
            let mut chain = self.stack[start..].to_vec();
            chain.push(name.to_string());
            return Err(Error::Cycle { chain });
        }
        self.stack.push(name.to_string());
        Ok(())
    }

    pub fn leave(&mut self) {
        self.stack.pop();
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reentering_a_name_is_a_cycle() {
        let mut chain = CallChain::default();
        chain.enter("order").unwrap();
        chain.enter("user").unwrap();
        chain.enter("team").unwrap();
        let err = chain.enter("user").unwrap_err();
        assert_eq!(err.to_string(), "dependency cycle detected: user -> team -> user");
    }

    #[test]
    fn siblings_may_share_a_dependency() {
        let mut chain = CallChain::default();
        chain.enter("order").unwrap();
        chain.enter("user").unwrap();
        chain.leave();
        chain.enter("user").unwrap();
        assert_eq!(chain.depth(), 2);
    }
}
