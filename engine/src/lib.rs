pub trait GameLogic {
    type State;
    type Input;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State;
}

/// Drives a [`GameLogic`] over an explicit input sequence, recording every
/// intermediate state so tests can assert against the whole run.
#[derive(Debug)]
pub struct HeadlessRunner<G: GameLogic> {
    game: G,
    states: Vec<G::State>,
}

impl<G: GameLogic> HeadlessRunner<G> {
    pub fn new(game: G) -> Self {
        let initial_state = game.initial_state();
        Self {
            game,
            states: vec![initial_state],
        }
    }

    pub fn frame(&self) -> usize {
        self.states.len() - 1
    }

    pub fn state(&self) -> &G::State {
        self.states
            .last()
            .expect("runner always holds at least the initial state")
    }

    pub fn history(&self) -> &[G::State] {
        &self.states
    }

    pub fn step(&mut self, input: G::Input) -> usize {
        let next_state = self.game.step(self.state(), input);
        self.states.push(next_state);
        self.frame()
    }

    pub fn run<I>(&mut self, inputs: I) -> usize
    where
        I: IntoIterator<Item = G::Input>,
    {
        let mut last_frame = self.frame();
        for input in inputs {
            last_frame = self.step(input);
        }
        last_frame
    }

    pub fn reset(&mut self) {
        let initial_state = self.game.initial_state();
        self.states = vec![initial_state];
    }
}
