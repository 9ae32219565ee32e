use super::connector::*;
use crate::data_structures::State;

use smallvec::{smallvec, SmallVec};
use strum_macros::{Display, EnumIter, EnumString};

/// Enum representing the catalog of primitive parts a circuit can be built from.
///
/// The string form of each variant is the type tag used in circuit descriptions.
///
/// # Example
/// ```
/// # use partsim::PartType;
/// let ty: PartType = "RAM16".parse().unwrap();
/// assert_eq!(ty, PartType::Ram16);
/// assert_eq!(ty.to_string(), "RAM16");
///
/// // The old spelling of the decoder is still accepted.
/// assert_eq!("Decode16".parse::<PartType>().unwrap(), PartType::Decoder16);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumString, Display, EnumIter)]
pub enum PartType {
    One,
    Zero,
    Not,
    Not16,
    And,
    And16,
    Or,
    Or16,
    Nand,
    Nand16,
    Xor,
    Xor16,
    Adder16,
    AndAll16,
    Copy16,
    FullAdder,
    #[strum(to_string = "Decoder16", serialize = "Decode16")]
    Decoder16,
    Encoder16,
    Mux2Way16,
    DMux2Way16,
    #[strum(to_string = "DFF")]
    Dff,
    Register16,
    #[strum(to_string = "RAM16")]
    Ram16,
}
use PartType::*;

/// Pin names of the 16 single bit lanes of [Decoder16] and [Encoder16].
const BIT_PINS: [&str; 16] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15",
];

/// Number of words in the memory of a [Ram16].
pub const RAM16_WORDS: usize = 1 << 16;

/// Pin names and memory size of a [PartType].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PinLayout {
    /// Pins read during the combinational pass.
    pub inputs: &'static [&'static str],
    /// Pins written during the combinational pass.
    pub outputs: &'static [&'static str],
    /// Pins only read when clocked state is committed.
    pub mids: &'static [&'static str],
    /// Number of memory words.
    pub memory: usize,
}

impl PinLayout {
    /// Returns the total number of pins.
    pub fn pin_count(&self) -> usize {
        self.inputs.len() + self.outputs.len() + self.mids.len()
    }

    /// Returns all the pin names, inputs first, then outputs, then mids.
    pub fn pins(&self) -> impl Iterator<Item = &'static str> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.mids.iter())
            .copied()
    }
}

impl PartType {
    /// Returns the [PinLayout] of the type.
    ///
    /// # Example
    /// ```
    /// # use partsim::PartType;
    /// let layout = PartType::FullAdder.layout();
    /// assert_eq!(layout.inputs, &["a", "b", "c"]);
    /// assert_eq!(layout.outputs, &["sum", "carry"]);
    /// assert_eq!(layout.memory, 0);
    /// ```
    pub fn layout(&self) -> PinLayout {
        let (inputs, outputs, mids, memory): (&[&str], &[&str], &[&str], usize) = match self {
            One | Zero => (&[], &["out"], &[], 0),
            Not | Not16 | Copy16 => (&["in"], &["out"], &[], 0),
            And | And16 | Or | Or16 | Nand | Nand16 | Xor | Xor16 | Adder16 => {
                (&["a", "b"], &["out"], &[], 0)
            }
            AndAll16 => (&["i"], &["out"], &[], 0),
            FullAdder => (&["a", "b", "c"], &["sum", "carry"], &[], 0),
            Decoder16 => (&["in"], &BIT_PINS, &[], 0),
            Encoder16 => (&BIT_PINS, &["out"], &[], 0),
            Mux2Way16 => (&["a", "b", "sel"], &["out"], &[], 0),
            DMux2Way16 => (&["in", "sel"], &["a", "b"], &[], 0),
            Dff => (&[], &["out"], &["in"], 1),
            Register16 => (&["load"], &["out"], &["in"], 1),
            Ram16 => (&["load", "address"], &["out"], &["in"], RAM16_WORDS),
        };
        PinLayout {
            inputs,
            outputs,
            mids,
            memory,
        }
    }

    /// Returns true if the type keeps state across cycles.
    pub fn is_clocked(&self) -> bool {
        matches!(self, Dff | Register16 | Ram16)
    }
}

/// Amount of input connectors kept in the stack for a part.
/// If a part has more than PART_INPUTS_TINYVEC_SIZE, they will spill into the heap.
pub(super) const PART_INPUTS_TINYVEC_SIZE: usize = 3;

/// A single primitive part of a circuit, with its pins resolved to connectors.
///
/// Clocked parts own their memory, the value they output during a cycle is what was
/// committed at the end of the previous one.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Part {
    ty: PartType,
    pub(super) inputs: SmallVec<[ConnectorIndex; PART_INPUTS_TINYVEC_SIZE]>,
    pub(super) outputs: SmallVec<[ConnectorIndex; 2]>,
    pub(super) mids: SmallVec<[ConnectorIndex; 1]>,
    memory: Box<[Value]>,
}

/// Wraps a 16 bit lane address into the memory of a [Ram16].
#[inline(always)]
fn address(value: Value) -> usize {
    (value & MASK_16) as usize
}

impl Part {
    /// Returns a new [Part] of type `ty` with zeroed memory.
    ///
    /// The connectors must be in the order of the pins in [PartType::layout].
    pub(super) fn new(
        ty: PartType,
        inputs: SmallVec<[ConnectorIndex; PART_INPUTS_TINYVEC_SIZE]>,
        outputs: SmallVec<[ConnectorIndex; 2]>,
        mids: SmallVec<[ConnectorIndex; 1]>,
    ) -> Self {
        let layout = ty.layout();
        debug_assert_eq!(inputs.len(), layout.inputs.len());
        debug_assert_eq!(outputs.len(), layout.outputs.len());
        debug_assert_eq!(mids.len(), layout.mids.len());
        Part {
            ty,
            inputs,
            outputs,
            mids,
            memory: vec![0; layout.memory].into_boxed_slice(),
        }
    }

    pub fn ty(&self) -> PartType {
        self.ty
    }

    pub fn inputs(&self) -> &[ConnectorIndex] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[ConnectorIndex] {
        &self.outputs
    }

    pub fn mids(&self) -> &[ConnectorIndex] {
        &self.mids
    }

    /// Returns the memory of the part, empty for combinational types.
    pub fn memory(&self) -> &[Value] {
        &self.memory
    }

    /// Writes `values` into memory starting at word 0 and returns the number of words written.
    ///
    /// Values that don't fit in the memory are ignored. Words keep their low 16 bits.
    pub fn load_memory(&mut self, values: &[Value]) -> usize {
        let written = values.len().min(self.memory.len());
        for (word, value) in self.memory.iter_mut().zip(values) {
            *word = value & MASK_16;
        }
        written
    }

    /// Returns true if every input is set and every output is unset.
    #[inline(always)]
    pub(super) fn is_ready(&self, state: &State) -> bool {
        self.inputs.iter().all(|c| state.is_set(c.idx))
            && self.outputs.iter().all(|c| !state.is_set(c.idx))
    }

    /// Calculates the outputs of the part from its inputs and writes them to `state`.
    ///
    /// # Panics
    ///
    /// Panics if an input is unset, see [Part::is_ready].
    pub(super) fn simulate(&self, state: &mut State) {
        let input = |i: usize| state.value(self.inputs[i].idx);

        let out: SmallVec<[Value; 2]> = match self.ty {
            One => smallvec![1],
            Zero => smallvec![0],
            Not => smallvec![!input(0) & MASK_1],
            Not16 => smallvec![!input(0) & MASK_16],
            And => smallvec![input(0) & input(1) & MASK_1],
            And16 => smallvec![input(0) & input(1) & MASK_16],
            Or => smallvec![(input(0) | input(1)) & MASK_1],
            Or16 => smallvec![(input(0) | input(1)) & MASK_16],
            Nand => smallvec![!(input(0) & input(1)) & MASK_1],
            Nand16 => smallvec![!(input(0) & input(1)) & MASK_16],
            Xor | Xor16 => {
                let (a, b) = (input(0), input(1));
                let mask = if self.ty == Xor { MASK_1 } else { MASK_16 };
                smallvec![((a & !b) | (!a & b)) & mask]
            }
            Adder16 => smallvec![input(0).wrapping_add(input(1)) & MASK_16],
            AndAll16 => smallvec![(input(0) & MASK_16 == MASK_16) as Value],
            Copy16 => smallvec![if input(0) & 1 == 0 { 0 } else { MASK_16 }],
            FullAdder => {
                let a = input(0) & MASK_1;
                let b = input(1) & MASK_1;
                let c = input(2) & MASK_1;
                smallvec![a ^ b ^ c, (a & b) | (a & c) | (b & c)]
            }
            Decoder16 => {
                let v = input(0);
                (0..BIT_PINS.len()).map(|j| (v >> j) & 1).collect()
            }
            Encoder16 => {
                let v = (0..BIT_PINS.len()).fold(0, |acc, j| acc | ((input(j) & 1) << j));
                smallvec![v]
            }
            Mux2Way16 => {
                let selected = if input(2) & 1 == 0 { input(0) } else { input(1) };
                smallvec![selected & MASK_16]
            }
            DMux2Way16 => {
                let v = input(0) & MASK_16;
                if input(1) & 1 == 0 {
                    smallvec![v, 0]
                } else {
                    smallvec![0, v]
                }
            }
            Dff | Register16 => smallvec![self.memory[0]],
            Ram16 => smallvec![self.memory[address(input(1))]],
        };

        debug_assert_eq!(out.len(), self.outputs.len());
        for (connector, value) in self.outputs.iter().zip(out) {
            state.set(connector.idx, value);
        }
    }

    /// Updates the memory of clocked parts from the connector values left by the combinational pass.
    pub(super) fn commit(&mut self, state: &State) {
        let load = || self.inputs.first().and_then(|c| state.get(c.idx)) == Some(1);
        let write = match self.ty {
            Dff => Some(0),
            Register16 => {
                if load() {
                    Some(0)
                } else {
                    None
                }
            }
            Ram16 => {
                if load() {
                    match state.get(self.inputs[1].idx) {
                        Some(a) => Some(address(a)),
                        None => {
                            clilog::warn!("RAM16 write skipped, address connector {} is unset", self.inputs[1]);
                            None
                        }
                    }
                } else {
                    None
                }
            }
            // Left explicitly to get errors when a new part type is added
            One | Zero | Not | Not16 | And | And16 | Or | Or16 | Nand | Nand16 | Xor | Xor16
            | Adder16 | AndAll16 | Copy16 | FullAdder | Decoder16 | Encoder16 | Mux2Way16
            | DMux2Way16 => None,
        };

        if let Some(word) = write {
            let staged = self.mids[0];
            match state.get(staged.idx) {
                Some(value) => {
                    clilog::trace!("{} memory[{}] <- {}", self.ty, word, value);
                    self.memory[word] = value & MASK_16;
                }
                None => clilog::warn!(
                    "{} write skipped, staged connector {} is unset",
                    self.ty,
                    staged
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    /// Returns a part of type `ty` whose connectors are numbered in pin order, inputs first.
    fn part(ty: PartType) -> (Part, State) {
        let layout = ty.layout();
        let mut next = 0..;
        let mut take = |n: usize| -> Vec<ConnectorIndex> {
            (&mut next).take(n).map(|i| ci!(i)).collect()
        };
        let inputs = take(layout.inputs.len()).into_iter().collect();
        let outputs = take(layout.outputs.len()).into_iter().collect();
        let mids = take(layout.mids.len()).into_iter().collect();
        (
            Part::new(ty, inputs, outputs, mids),
            State::new(layout.pin_count()),
        )
    }

    fn eval(ty: PartType, inputs: &[Value]) -> Vec<Value> {
        let (p, mut state) = part(ty);
        for (c, v) in p.inputs.iter().zip(inputs) {
            state.set(c.idx, *v);
        }
        assert!(p.is_ready(&state));
        p.simulate(&mut state);
        p.outputs.iter().map(|c| state.value(c.idx)).collect()
    }

    #[test]
    fn test_every_type_has_pins() {
        for ty in PartType::iter() {
            assert!(ty.layout().pin_count() > 0, "{}", ty);
            assert_eq!(ty.to_string().parse::<PartType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_constants() {
        assert_eq!(eval(One, &[]), [1]);
        assert_eq!(eval(Zero, &[]), [0]);
    }

    #[test]
    fn test_1_bit_truth_tables() {
        assert_eq!(eval(Not, &[0]), [1]);
        assert_eq!(eval(Not, &[1]), [0]);
        for a in 0..2 {
            for b in 0..2 {
                let (x, y) = (a == 1, b == 1);
                assert_eq!(eval(And, &[a, b]), [(x && y) as Value], "{} and {}", a, b);
                assert_eq!(eval(Or, &[a, b]), [(x || y) as Value], "{} or {}", a, b);
                assert_eq!(eval(Nand, &[a, b]), [!(x && y) as Value], "{} nand {}", a, b);
                assert_eq!(eval(Xor, &[a, b]), [(x ^ y) as Value], "{} xor {}", a, b);
            }
        }
    }

    #[test]
    fn test_16_bit_gates() {
        assert_eq!(eval(Not16, &[0]), [0xFFFF]);
        assert_eq!(eval(Not16, &[0xFFFF]), [0]);
        assert_eq!(eval(And16, &[0xFF00, 0x0FF0]), [0x0F00]);
        assert_eq!(eval(Or16, &[0xFF00, 0x0FF0]), [0xFFF0]);
        assert_eq!(eval(Nand16, &[0xFF00, 0x0FF0]), [0xF0FF]);
        assert_eq!(eval(Xor16, &[0xFF00, 0x0FF0]), [0xF0F0]);
    }

    #[test]
    fn test_adder16_wraps() {
        assert_eq!(eval(Adder16, &[0xFFFF, 0x0001]), [0]);
        assert_eq!(eval(Adder16, &[2, 3]), [5]);
    }

    #[test]
    fn test_and_all16() {
        assert_eq!(eval(AndAll16, &[0xFFFF]), [1]);
        assert_eq!(eval(AndAll16, &[0xFFFE]), [0]);
        assert_eq!(eval(AndAll16, &[0]), [0]);
    }

    #[test]
    fn test_copy16() {
        assert_eq!(eval(Copy16, &[1]), [0xFFFF]);
        assert_eq!(eval(Copy16, &[3]), [0xFFFF]);
        assert_eq!(eval(Copy16, &[2]), [0]);
    }

    #[test]
    fn test_full_adder() {
        for a in 0..2 {
            for b in 0..2 {
                for c in 0..2 {
                    let count = a + b + c;
                    assert_eq!(
                        eval(FullAdder, &[a, b, c]),
                        [count % 2, (count >= 2) as Value],
                        "a:{} b:{} c:{}",
                        a,
                        b,
                        c
                    );
                }
            }
        }
    }

    #[test]
    fn test_decoder_encoder() {
        let bits = eval(Decoder16, &[0x1234]);
        assert_eq!(bits.len(), 16);
        assert_eq!(&bits[..8], &[0, 0, 1, 0, 1, 1, 0, 0]);
        assert_eq!(eval(Encoder16, &bits), [0x1234]);
    }

    #[test]
    fn test_mux_and_dmux() {
        assert_eq!(eval(Mux2Way16, &[7, 9, 0]), [7]);
        assert_eq!(eval(Mux2Way16, &[7, 9, 1]), [9]);
        assert_eq!(eval(Mux2Way16, &[7, 9, 2]), [7]);
        assert_eq!(eval(DMux2Way16, &[7, 0]), [7, 0]);
        assert_eq!(eval(DMux2Way16, &[7, 3]), [0, 7]);
    }

    #[test]
    fn test_clocked_parts_output_memory() {
        assert_eq!(eval(Dff, &[]), [0]);
        assert_eq!(eval(Register16, &[1]), [0]);
        assert_eq!(eval(Ram16, &[0, 5]), [0]);
    }

    #[test]
    fn test_register_commit_needs_load() {
        let (mut p, mut state) = part(Register16);
        state.set(p.inputs[0].idx, 0);
        state.set(p.mids[0].idx, 42);
        p.commit(&state);
        assert_eq!(p.memory(), &[0]);

        state.set(p.inputs[0].idx, 1);
        p.commit(&state);
        assert_eq!(p.memory(), &[42]);
    }

    #[test]
    fn test_dff_commit_unset_keeps_memory() {
        let (mut p, mut state) = part(Dff);
        state.set(p.mids[0].idx, 1);
        p.commit(&state);
        assert_eq!(p.memory(), &[1]);

        state.reset();
        p.commit(&state);
        assert_eq!(p.memory(), &[1]);
    }

    #[test]
    fn test_dff_keeps_full_word() {
        let (mut p, mut state) = part(Dff);
        state.set(p.mids[0].idx, 5);
        p.commit(&state);
        assert_eq!(p.memory(), &[5]);

        state.set(p.mids[0].idx, 0x1_2345);
        p.commit(&state);
        assert_eq!(p.memory(), &[0x2345]);
    }

    #[test]
    fn test_load_memory() {
        let (mut p, _) = part(Ram16);
        assert_eq!(p.memory().len(), RAM16_WORDS);
        assert_eq!(p.load_memory(&[5, -1]), 2);
        assert_eq!(&p.memory()[..3], &[5, 0xFFFF, 0]);

        let (mut p, _) = part(Register16);
        assert_eq!(p.load_memory(&[1, 2, 3]), 1);
        assert_eq!(p.memory(), &[1]);

        let (mut p, _) = part(Not);
        assert_eq!(p.load_memory(&[1]), 0);
    }

    proptest! {
        #[test]
        fn prop_bitwise_lanes_are_independent(a in 0..=0xFFFFi64, b in 0..=0xFFFFi64) {
            let and = eval(And16, &[a, b])[0];
            let or = eval(Or16, &[a, b])[0];
            let nand = eval(Nand16, &[a, b])[0];
            let xor = eval(Xor16, &[a, b])[0];
            for bit in 0..16 {
                let x = (a >> bit) & 1;
                let y = (b >> bit) & 1;
                prop_assert_eq!((and >> bit) & 1, eval(And, &[x, y])[0]);
                prop_assert_eq!((or >> bit) & 1, eval(Or, &[x, y])[0]);
                prop_assert_eq!((nand >> bit) & 1, eval(Nand, &[x, y])[0]);
                prop_assert_eq!((xor >> bit) & 1, eval(Xor, &[x, y])[0]);
            }
        }

        #[test]
        fn prop_adder16_commutes(a in 0..=0xFFFFi64, b in 0..=0xFFFFi64) {
            let sum = eval(Adder16, &[a, b]);
            prop_assert_eq!(&sum, &eval(Adder16, &[b, a]));
            prop_assert_eq!(sum[0], (a + b) % 65536);
        }

        #[test]
        fn prop_mux_ignores_high_sel_bits(a in 0..=0xFFFFi64, b in 0..=0xFFFFi64, sel in 0..=0xFFFFi64) {
            let expected = if sel & 1 == 0 { a } else { b };
            prop_assert_eq!(eval(Mux2Way16, &[a, b, sel]), vec![expected]);
        }
    }
}
