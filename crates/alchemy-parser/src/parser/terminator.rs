//! Terminator states for panic-mode recovery.
//!
//! Each parsing frame pushes bits describing which tokens should end the
//! enclosing construct. `is_terminator` walks the set bits and asks each
//! predicate whether the current token is a synchronization point.

use alchemy_syntax::SyntaxKind;
use bitflags::bitflags;

use super::core::Parser;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct TerminatorState: u32 {
        const IS_NAMESPACE_MEMBER_START_OR_STOP = 1 << 0;
        const IS_ATTRIBUTE_DECLARATION_TERMINATOR = 1 << 1;
        const IS_POSSIBLE_AGGREGATE_CLAUSE_START_OR_STOP = 1 << 2;
        const IS_POSSIBLE_MEMBER_START_OR_STOP = 1 << 3;
        const IS_END_OF_RETURN_TYPE = 1 << 4;
        const IS_END_OF_PARAMETER_LIST = 1 << 5;
        const IS_END_OF_FIELD_DECLARATION = 1 << 6;
        const IS_POSSIBLE_END_OF_VARIABLE_DECLARATION = 1 << 7;
        const IS_END_OF_TYPE_ARGUMENT_LIST = 1 << 8;
        const IS_POSSIBLE_STATEMENT_START_OR_STOP = 1 << 9;
        const IS_END_OF_FIXED_STATEMENT = 1 << 10;
        const IS_END_OF_TRY_BLOCK = 1 << 11;
        const IS_END_OF_CATCH_CLAUSE = 1 << 12;
        const IS_END_OF_FILTER_CLAUSE = 1 << 13;
        const IS_END_OF_CATCH_BLOCK = 1 << 14;
        const IS_END_OF_DO_WHILE_EXPRESSION = 1 << 15;
        const IS_END_OF_FOR_STATEMENT_ARGUMENT = 1 << 16;
        const IS_END_OF_DECLARATION_CLAUSE = 1 << 17;
        const IS_END_OF_ARGUMENT_LIST = 1 << 18;
        const IS_SWITCH_SECTION_START = 1 << 19;
        const IS_END_OF_TYPE_PARAMETER_LIST = 1 << 20;
        const IS_END_OF_METHOD_SIGNATURE = 1 << 21;
        const IS_END_OF_NAME_IN_EXPLICIT_INTERFACE = 1 << 22;
        // Function-pointer syntax is not in the grammar yet; the bits are
        // kept so saved terminator sets stay layout-stable.
        const IS_END_OF_FUNCTION_POINTER_PARAMETER_LIST = 1 << 23;
        const IS_END_OF_FUNCTION_POINTER_PARAMETER_LIST_ERRORED = 1 << 24;
        const IS_END_OF_FUNCTION_POINTER_CALLING_CONVENTION = 1 << 25;
        const IS_END_OF_TYPE_SIGNATURE = 1 << 26;
        const IS_EXPRESSION_OR_PATTERN_IN_CASE_LABEL = 1 << 27;
        const IS_PATTERN_IN_SWITCH_EXPRESSION_ARM = 1 << 28;
    }
}

impl Parser<'_> {
    /// True when the current token terminates the enclosing construct
    /// according to any active terminator bit. End of file always does.
    pub(crate) fn is_terminator(&mut self) -> bool {
        if self.at(SyntaxKind::Eof) {
            return true;
        }

        let mut bits = self.term_state.bits();
        while bits != 0 {
            let bit = TerminatorState::from_bits_truncate(bits & bits.wrapping_neg());
            bits &= bits - 1;

            if self.bit_terminates(bit) {
                return true;
            }
        }

        false
    }

    fn bit_terminates(&mut self, bit: TerminatorState) -> bool {
        use SyntaxKind::*;

        if bit == TerminatorState::IS_NAMESPACE_MEMBER_START_OR_STOP {
            self.is_namespace_member_start_or_stop()
        } else if bit == TerminatorState::IS_POSSIBLE_MEMBER_START_OR_STOP {
            self.is_possible_member_start_or_stop()
        } else if bit == TerminatorState::IS_END_OF_RETURN_TYPE {
            self.is_end_of_return_type()
        } else if bit == TerminatorState::IS_END_OF_PARAMETER_LIST {
            self.is_end_of_parameter_list()
        } else if bit == TerminatorState::IS_END_OF_FIELD_DECLARATION {
            self.at(SemicolonToken)
        } else if bit == TerminatorState::IS_POSSIBLE_END_OF_VARIABLE_DECLARATION {
            matches!(self.current(), CommaToken | SemicolonToken)
        } else if bit == TerminatorState::IS_END_OF_TYPE_ARGUMENT_LIST {
            self.at(GreaterThanToken)
        } else if bit == TerminatorState::IS_POSSIBLE_STATEMENT_START_OR_STOP {
            self.at(SemicolonToken) || self.is_possible_statement(true)
        } else if bit == TerminatorState::IS_END_OF_TRY_BLOCK {
            matches!(
                self.current(),
                CloseBraceToken | CatchKeyword | FinallyKeyword
            )
        } else if bit == TerminatorState::IS_END_OF_CATCH_CLAUSE
            || bit == TerminatorState::IS_END_OF_FILTER_CLAUSE
        {
            matches!(
                self.current(),
                CloseParenToken | OpenBraceToken | CloseBraceToken | CatchKeyword | FinallyKeyword
            )
        } else if bit == TerminatorState::IS_END_OF_CATCH_BLOCK {
            matches!(
                self.current(),
                CloseBraceToken | CatchKeyword | FinallyKeyword
            )
        } else if bit == TerminatorState::IS_END_OF_DO_WHILE_EXPRESSION {
            matches!(self.current(), CloseParenToken | SemicolonToken)
        } else if bit == TerminatorState::IS_END_OF_FOR_STATEMENT_ARGUMENT {
            matches!(
                self.current(),
                SemicolonToken | CloseParenToken | OpenBraceToken
            )
        } else if bit == TerminatorState::IS_END_OF_DECLARATION_CLAUSE {
            matches!(
                self.current(),
                SemicolonToken | CloseParenToken | ColonToken
            )
        } else if bit == TerminatorState::IS_END_OF_ARGUMENT_LIST {
            matches!(
                self.current(),
                CloseParenToken | CloseBracketToken | SemicolonToken
            )
        } else if bit == TerminatorState::IS_SWITCH_SECTION_START {
            matches!(self.current(), CaseKeyword | DefaultKeyword)
        } else if bit == TerminatorState::IS_END_OF_TYPE_PARAMETER_LIST {
            matches!(
                self.current(),
                GreaterThanToken | OpenParenToken | OpenBraceToken | ColonToken
            ) || self.at_contextual(WhereKeyword)
        } else if bit == TerminatorState::IS_END_OF_METHOD_SIGNATURE {
            matches!(self.current(), SemicolonToken | OpenBraceToken)
        } else if bit == TerminatorState::IS_END_OF_NAME_IN_EXPLICIT_INTERFACE {
            matches!(self.current(), DotToken | ColonColonToken)
        } else if bit == TerminatorState::IS_END_OF_TYPE_SIGNATURE {
            matches!(self.current(), OpenBraceToken | SemicolonToken)
        } else {
            // The function-pointer and case-label bits have no predicate.
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_original_bits_exist() {
        // 29 distinct states; the three function-pointer bits are reserved.
        assert_eq!(TerminatorState::all().bits().count_ones(), 29);
    }

    #[test]
    fn lowest_bit_iteration_order() {
        let set = TerminatorState::IS_END_OF_PARAMETER_LIST
            | TerminatorState::IS_NAMESPACE_MEMBER_START_OR_STOP;
        let lowest = set.bits() & set.bits().wrapping_neg();
        assert_eq!(
            TerminatorState::from_bits_truncate(lowest),
            TerminatorState::IS_NAMESPACE_MEMBER_START_OR_STOP
        );
    }
}
