// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: open the stores, hand records
// to the Guesser, collect what the CLI prints.
//
// Rules for this layer:
//   - No tensor math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - No file formats here (that's Layers 4 and 6)

// Print one record the way a human wants to read it
pub mod inspect_use_case;

// Score one record, or every record, with the Guesser
pub mod guess_use_case;
