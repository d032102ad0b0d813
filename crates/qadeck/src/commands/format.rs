const FORMAT_REFERENCE: &str = "\
qadeck deck format
==================

A deck is a markdown file. Items are separated by a line containing only
`---` with a blank line above and below it.

Frontmatter (optional, at the very top):

    ---
    title: Rust ownership quiz
    theme: dark            # light | dark
    ---

Item kinds:

  Question    Markdown above a `???` line is the question, markdown below
              it is the answer. Each question takes two steps: first the
              question, then its answer.

                  What does `&mut` mean?

                  ???

                  A unique, mutable borrow.

  Section     An item that is a single `#` or `##` heading.

                  # Part two

  Block       Anything else. Shown as-is once the deck reaches it.

Choice prompts (inside any item, usually an answer):

    ```choice
    Yes
    No
    ```

Each non-empty line is one option. Picking an option for the first time
moves the deck on by one step after a short pause.

Keys:

  Space, Right       next step
  Backspace, Left    previous step
  Home               back to the start
  Double-click       toggle fullscreen
  Click a dimmed question to mark it as seen.
";

pub fn run() {
    print!("{FORMAT_REFERENCE}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{self, Item};

    /// The examples in the reference parse the way it says they do.
    #[test]
    fn test_reference_examples_parse() {
        let deck = deck::parse(
            "What does `&mut` mean?\n\n???\n\nA unique, mutable borrow.\n\n---\n\n# Part two\n",
        );
        assert!(matches!(deck.items[0], Item::QuestionAnswer { .. }));
        assert!(matches!(deck.items[1], Item::Section { .. }));
        assert!(FORMAT_REFERENCE.contains("```choice"));
    }
}
