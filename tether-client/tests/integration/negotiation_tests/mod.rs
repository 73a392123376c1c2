mod test_duplicate_answer_ignored;
mod test_offer_answer_connects;
