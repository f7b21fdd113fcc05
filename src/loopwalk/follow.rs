use itertools::Itertools;
use loopwalk::NodeId;
use loopwalk::loops::SearchObserver;
use std::io::{BufRead, Write};
use std::ops::ControlFlow;

/// Pauses the search before every expansion and waits for a command:
///
/// * empty line: next expansion
/// * a number `n`: run `n` expansions without pausing
/// * `c`: run to the end without pausing
/// * `q`: stop the search and keep what was found so far
///
/// End of input behaves like `c`.
pub struct Follower<R, W> {
    input: R,
    output: W,
    skip: usize,
    running: bool,
    step: usize,
}

impl<R: BufRead, W: Write> Follower<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            skip: 0,
            running: false,
            step: 0,
        }
    }
}

impl<R: BufRead, W: Write> SearchObserver for Follower<R, W> {
    fn on_expand(&mut self, path: &[NodeId], candidates: &[NodeId]) -> ControlFlow<()> {
        self.step += 1;
        if self.running {
            return ControlFlow::Continue(());
        }

        // Write errors are ignored and the search carries on.
        let _ = writeln!(
            self.output,
            "#{} at {} via [{}] -> next [{}]",
            self.step,
            path.last().copied().unwrap_or_default(),
            path.iter().join(", "),
            candidates.iter().join(", ")
        );

        if self.skip > 0 {
            self.skip -= 1;
            return ControlFlow::Continue(());
        }

        let _ = write!(self.output, "[enter/n/c/q] ");
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                self.running = true;
                ControlFlow::Continue(())
            }
            Ok(_) => match line.trim() {
                "q" => ControlFlow::Break(()),
                "c" => {
                    self.running = true;
                    ControlFlow::Continue(())
                }
                other => {
                    self.skip = other.parse().unwrap_or(0);
                    ControlFlow::Continue(())
                }
            },
        }
    }
}
