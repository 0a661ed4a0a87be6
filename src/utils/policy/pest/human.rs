use crate::utils::policy::pest::{PolicyLeaf, PolicyNode};
use pest::iterators::Pair;

#[derive(Parser)]
#[grammar = "human.policy.pest"]
pub(crate) struct HumanPolicyParser;

pub(crate) fn parse<'a>(pair: Pair<'a, Rule>, index: &mut usize) -> PolicyNode<'a> {
    match pair.as_rule() {
        Rule::leaf => {
            let mut inner = pair.into_inner();
            let name = inner.next().unwrap().as_str();
            let value = inner.next().map(|v| v.as_str());
            let leaf = PolicyLeaf { name, value, index: *index };
            *index += 1;
            PolicyNode::Leaf(leaf)
        }
        Rule::and => {
            let mut vec = Vec::new();
            for child in pair.into_inner() {
                vec.push(parse(child, index));
            }
            PolicyNode::And(vec)
        }
        Rule::or => {
            let mut vec = Vec::new();
            for child in pair.into_inner() {
                vec.push(parse(child, index));
            }
            PolicyNode::Or(vec)
        }
        Rule::content
        | Rule::EOI
        | Rule::inner
        | Rule::orvalue
        | Rule::andvalue
        | Rule::term
        | Rule::or_kw
        | Rule::and_kw
        | Rule::name
        | Rule::value
        | Rule::ident
        | Rule::keyword
        | Rule::WHITESPACE => unreachable!(),
    }
}
