use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::CardError;

/// Number of distinct values an attribute can take.
pub const ATTRIBUTE_VALUES: u8 = 3;

/// The four attributes every card carries.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Color,
    Shape,
    Fill,
    Number,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Color,
        Attribute::Shape,
        Attribute::Fill,
        Attribute::Number,
    ];

    const fn shift(self) -> u8 {
        match self {
            Self::Color => 0,
            Self::Shape => 2,
            Self::Fill => 4,
            Self::Number => 6,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Color => "color",
            Self::Shape => "shape",
            Self::Fill => "fill",
            Self::Number => "number",
        };
        write!(f, "{repr}")
    }
}

/// A card packs its four attributes into a single byte, two bits each:
/// `color | shape << 2 | fill << 4 | number << 6`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Card(u8);

impl Card {
    pub fn new(color: u8, shape: u8, fill: u8, number: u8) -> Result<Self, CardError> {
        let mut value = 0;
        for (attribute, v) in Attribute::ALL.into_iter().zip([color, shape, fill, number]) {
            if v >= ATTRIBUTE_VALUES {
                return Err(CardError::InvalidAttribute {
                    attribute,
                    value: v,
                });
            }
            value |= v << attribute.shift();
        }
        Ok(Self(value))
    }

    #[must_use]
    pub const fn attribute(self, attribute: Attribute) -> u8 {
        (self.0 >> attribute.shift()) & 0b11
    }

    /// Packed representation.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns the attributes on which the three cards fail to be either
    /// all equal or all different. An empty result means the cards form a
    /// trio.
    #[must_use]
    pub fn is_trio(a: Card, b: Card, c: Card) -> Vec<Attribute> {
        Attribute::ALL
            .into_iter()
            .filter(|&attribute| !attribute_matches(a, b, c, attribute))
            .collect()
    }

    /// Allocation-free form of [`Card::is_trio`] for the board search.
    #[must_use]
    pub fn forms_trio(a: Card, b: Card, c: Card) -> bool {
        Attribute::ALL
            .into_iter()
            .all(|attribute| attribute_matches(a, b, c, attribute))
    }
}

// With values in 0..3, three values are all equal or all distinct exactly
// when their sum is a multiple of 3.
fn attribute_matches(a: Card, b: Card, c: Card, attribute: Attribute) -> bool {
    (a.attribute(attribute) + b.attribute(attribute) + c.attribute(attribute)) % ATTRIBUTE_VALUES
        == 0
}

impl TryFrom<u8> for Card {
    type Error = CardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let field = |attribute: Attribute| (value >> attribute.shift()) & 0b11;
        Self::new(
            field(Attribute::Color),
            field(Attribute::Shape),
            field(Attribute::Fill),
            field(Attribute::Number),
        )
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> Self {
        card.0
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}{}{}{}]",
            self.attribute(Attribute::Color),
            self.attribute(Attribute::Shape),
            self.attribute(Attribute::Fill),
            self.attribute(Attribute::Number)
        )
    }
}

/// Finds the first trio among the occupied slots, scanning positions in
/// lexicographic order.
#[must_use]
pub fn find_trio(board: &[Option<Card>]) -> Option<[usize; 3]> {
    let occupied: Vec<(usize, Card)> = board
        .iter()
        .enumerate()
        .filter_map(|(pos, slot)| slot.map(|card| (pos, card)))
        .collect();

    for (i, &(pos1, card1)) in occupied.iter().enumerate() {
        for (j, &(pos2, card2)) in occupied.iter().enumerate().skip(i + 1) {
            for &(pos3, card3) in occupied.iter().skip(j + 1) {
                if Card::forms_trio(card1, card2, card3) {
                    return Some([pos1, pos2, pos3]);
                }
            }
        }
    }
    None
}
